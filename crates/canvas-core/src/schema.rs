//! Node and relation catalogue shared by the knowledge-graph editor and the
//! pipeline designer.
//!
//! Every subtype refines exactly one [`Category`], has a fixed footprint, and
//! names the [`ConfigSchema`] its typed [`NodeConfig`] must follow. All of
//! this is resolved through the [`SUBTYPES`] lookup table rather than
//! per-call-site matches.

use kurbo::Size;
use serde::{Deserialize, Serialize};

// ─── Editors & categories ────────────────────────────────────────────────

/// Which diagram editor a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    KnowledgeGraph,
    Pipeline,
}

/// Coarse node classification shown in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Knowledge graph
    Equipment,
    Component,
    Fault,
    Symptom,
    DiagnosisStep,
    Solution,
    // Pipeline
    Source,
    Processor,
    Model,
    Sink,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Equipment,
        Category::Component,
        Category::Fault,
        Category::Symptom,
        Category::DiagnosisStep,
        Category::Solution,
        Category::Source,
        Category::Processor,
        Category::Model,
        Category::Sink,
    ];

    pub fn editor(self) -> EditorKind {
        match self {
            Self::Equipment
            | Self::Component
            | Self::Fault
            | Self::Symptom
            | Self::DiagnosisStep
            | Self::Solution => EditorKind::KnowledgeGraph,
            Self::Source | Self::Processor | Self::Model | Self::Sink => EditorKind::Pipeline,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Equipment => "Equipment",
            Self::Component => "Component",
            Self::Fault => "Fault",
            Self::Symptom => "Symptom",
            Self::DiagnosisStep => "Diagnosis step",
            Self::Solution => "Solution",
            Self::Source => "Source",
            Self::Processor => "Processor",
            Self::Model => "Model",
            Self::Sink => "Sink",
        }
    }

    /// Subtypes refining this category, in palette order.
    pub fn sub_types(self) -> impl Iterator<Item = SubType> {
        SUBTYPES
            .iter()
            .filter(move |spec| spec.category == self)
            .map(|spec| spec.sub_type)
    }
}

/// Concrete node kind; refines a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubType {
    Crane,
    Conveyor,
    Motor,
    Gearbox,
    Bearing,
    MechanicalFault,
    ElectricalFault,
    Vibration,
    Temperature,
    Noise,
    Inspection,
    Measurement,
    Repair,
    Replacement,
    SensorStream,
    HistorianQuery,
    Filter,
    FeatureExtraction,
    Aggregation,
    AnomalyDetector,
    WorldModel,
    Alert,
    Storage,
}

/// Typed field schema a subtype's config follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSchema {
    Equipment,
    Fault,
    Symptom,
    Diagnosis,
    Solution,
    Source,
    Filter,
    Features,
    Aggregation,
    Model,
    Sink,
}

/// One row of the subtype lookup table.
#[derive(Debug, Clone, Copy)]
pub struct SubtypeSpec {
    pub sub_type: SubType,
    pub category: Category,
    pub display_name: &'static str,
    pub width: f64,
    pub height: f64,
    pub schema: ConfigSchema,
}

impl SubtypeSpec {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

const fn row(
    sub_type: SubType,
    category: Category,
    display_name: &'static str,
    width: f64,
    height: f64,
    schema: ConfigSchema,
) -> SubtypeSpec {
    SubtypeSpec {
        sub_type,
        category,
        display_name,
        width,
        height,
        schema,
    }
}

// Knowledge-graph nodes are 160×56; pipeline stages are 180×64.
pub static SUBTYPES: &[SubtypeSpec] = &[
    row(SubType::Crane, Category::Equipment, "Crane", 160.0, 56.0, ConfigSchema::Equipment),
    row(SubType::Conveyor, Category::Equipment, "Conveyor", 160.0, 56.0, ConfigSchema::Equipment),
    row(SubType::Motor, Category::Component, "Motor", 160.0, 56.0, ConfigSchema::Equipment),
    row(SubType::Gearbox, Category::Component, "Gearbox", 160.0, 56.0, ConfigSchema::Equipment),
    row(SubType::Bearing, Category::Component, "Bearing", 160.0, 56.0, ConfigSchema::Equipment),
    row(SubType::MechanicalFault, Category::Fault, "Mechanical fault", 160.0, 56.0, ConfigSchema::Fault),
    row(SubType::ElectricalFault, Category::Fault, "Electrical fault", 160.0, 56.0, ConfigSchema::Fault),
    row(SubType::Vibration, Category::Symptom, "Vibration", 160.0, 56.0, ConfigSchema::Symptom),
    row(SubType::Temperature, Category::Symptom, "Temperature", 160.0, 56.0, ConfigSchema::Symptom),
    row(SubType::Noise, Category::Symptom, "Noise", 160.0, 56.0, ConfigSchema::Symptom),
    row(SubType::Inspection, Category::DiagnosisStep, "Inspection", 160.0, 56.0, ConfigSchema::Diagnosis),
    row(SubType::Measurement, Category::DiagnosisStep, "Measurement", 160.0, 56.0, ConfigSchema::Diagnosis),
    row(SubType::Repair, Category::Solution, "Repair", 160.0, 56.0, ConfigSchema::Solution),
    row(SubType::Replacement, Category::Solution, "Replacement", 160.0, 56.0, ConfigSchema::Solution),
    row(SubType::SensorStream, Category::Source, "Sensor stream", 180.0, 64.0, ConfigSchema::Source),
    row(SubType::HistorianQuery, Category::Source, "Historian query", 180.0, 64.0, ConfigSchema::Source),
    row(SubType::Filter, Category::Processor, "Filter", 180.0, 64.0, ConfigSchema::Filter),
    row(SubType::FeatureExtraction, Category::Processor, "Feature extraction", 180.0, 64.0, ConfigSchema::Features),
    row(SubType::Aggregation, Category::Processor, "Aggregation", 180.0, 64.0, ConfigSchema::Aggregation),
    row(SubType::AnomalyDetector, Category::Model, "Anomaly detector", 180.0, 64.0, ConfigSchema::Model),
    row(SubType::WorldModel, Category::Model, "World model", 180.0, 64.0, ConfigSchema::Model),
    row(SubType::Alert, Category::Sink, "Alert", 180.0, 64.0, ConfigSchema::Sink),
    row(SubType::Storage, Category::Sink, "Storage", 180.0, 64.0, ConfigSchema::Sink),
];

impl SubType {
    /// Look up this subtype's catalogue row.
    pub fn spec(self) -> &'static SubtypeSpec {
        SUBTYPES
            .iter()
            .find(|spec| spec.sub_type == self)
            .unwrap_or_else(|| unreachable!("every SubType has a SUBTYPES row"))
    }

    pub fn category(self) -> Category {
        self.spec().category
    }

    pub fn size(self) -> Size {
        self.spec().size()
    }

    pub fn schema(self) -> ConfigSchema {
        self.spec().schema
    }

    /// Whether this subtype refines `category`.
    pub fn refines(self, category: Category) -> bool {
        self.category() == category
    }

    /// Short lowercase stem used for generated node IDs.
    pub fn id_prefix(self) -> String {
        self.spec().display_name.to_lowercase().replace(' ', "_")
    }
}

// ─── Typed node configs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    BandStop,
    MovingAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFn {
    Count,
    Sum,
    #[default]
    Mean,
    Min,
    Max,
    StdDev,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquipmentConfig {
    pub asset_code: String,
    pub manufacturer: String,
    pub rated_power_kw: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaultConfig {
    pub fault_code: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymptomConfig {
    pub sensor_channel: String,
    pub threshold: Option<f64>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosisConfig {
    pub instructions: String,
    pub expected_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolutionConfig {
    pub procedure: String,
    pub downtime_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    pub topic: String,
    pub sample_rate_hz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    pub kind: FilterKind,
    pub cutoff_hz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureConfig {
    pub features: Vec<String>,
    pub window_size: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregationConfig {
    pub window_secs: u32,
    pub function: AggregateFn,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    pub model_name: String,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SinkConfig {
    pub target: String,
}

/// Per-node configuration, tagged by the schema its subtype names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum NodeConfig {
    Equipment(EquipmentConfig),
    Fault(FaultConfig),
    Symptom(SymptomConfig),
    Diagnosis(DiagnosisConfig),
    Solution(SolutionConfig),
    Source(SourceConfig),
    Filter(FilterConfig),
    Features(FeatureConfig),
    Aggregation(AggregationConfig),
    Model(ModelConfig),
    Sink(SinkConfig),
}

impl NodeConfig {
    /// An empty (all-default) config following `schema`.
    pub fn empty(schema: ConfigSchema) -> Self {
        match schema {
            ConfigSchema::Equipment => Self::Equipment(EquipmentConfig::default()),
            ConfigSchema::Fault => Self::Fault(FaultConfig::default()),
            ConfigSchema::Symptom => Self::Symptom(SymptomConfig::default()),
            ConfigSchema::Diagnosis => Self::Diagnosis(DiagnosisConfig::default()),
            ConfigSchema::Solution => Self::Solution(SolutionConfig::default()),
            ConfigSchema::Source => Self::Source(SourceConfig::default()),
            ConfigSchema::Filter => Self::Filter(FilterConfig::default()),
            ConfigSchema::Features => Self::Features(FeatureConfig::default()),
            ConfigSchema::Aggregation => Self::Aggregation(AggregationConfig::default()),
            ConfigSchema::Model => Self::Model(ModelConfig::default()),
            ConfigSchema::Sink => Self::Sink(SinkConfig::default()),
        }
    }

    /// Empty config for a subtype, resolved through the lookup table.
    pub fn for_sub_type(sub_type: SubType) -> Self {
        Self::empty(sub_type.schema())
    }

    pub fn schema(&self) -> ConfigSchema {
        match self {
            Self::Equipment(_) => ConfigSchema::Equipment,
            Self::Fault(_) => ConfigSchema::Fault,
            Self::Symptom(_) => ConfigSchema::Symptom,
            Self::Diagnosis(_) => ConfigSchema::Diagnosis,
            Self::Solution(_) => ConfigSchema::Solution,
            Self::Source(_) => ConfigSchema::Source,
            Self::Filter(_) => ConfigSchema::Filter,
            Self::Features(_) => ConfigSchema::Features,
            Self::Aggregation(_) => ConfigSchema::Aggregation,
            Self::Model(_) => ConfigSchema::Model,
            Self::Sink(_) => ConfigSchema::Sink,
        }
    }

    /// Whether this config is valid for `sub_type`.
    pub fn fits(&self, sub_type: SubType) -> bool {
        self.schema() == sub_type.schema()
    }
}

// ─── Relations ───────────────────────────────────────────────────────────

/// Typed relation carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Causes,
    HasPart,
    HasSymptom,
    DiagnosedBy,
    ResolvedBy,
    RelatedTo,
    FeedsInto,
}

impl RelationType {
    pub const ALL: [RelationType; 7] = [
        RelationType::Causes,
        RelationType::HasPart,
        RelationType::HasSymptom,
        RelationType::DiagnosedBy,
        RelationType::ResolvedBy,
        RelationType::RelatedTo,
        RelationType::FeedsInto,
    ];

    /// Label used when an edge carries no explicit label.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Causes => "causes",
            Self::HasPart => "has part",
            Self::HasSymptom => "has symptom",
            Self::DiagnosedBy => "diagnosed by",
            Self::ResolvedBy => "resolved by",
            Self::RelatedTo => "related to",
            Self::FeedsInto => "feeds into",
        }
    }

    /// Relations offered by the picker in a given editor.
    pub fn offered_in(editor: EditorKind) -> &'static [RelationType] {
        match editor {
            EditorKind::KnowledgeGraph => &[
                RelationType::Causes,
                RelationType::HasPart,
                RelationType::HasSymptom,
                RelationType::DiagnosedBy,
                RelationType::ResolvedBy,
                RelationType::RelatedTo,
            ],
            EditorKind::Pipeline => &[RelationType::FeedsInto],
        }
    }

    /// Parse the wire name (`"CAUSES"`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Wire name (`"CAUSES"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Causes => "CAUSES",
            Self::HasPart => "HAS_PART",
            Self::HasSymptom => "HAS_SYMPTOM",
            Self::DiagnosedBy => "DIAGNOSED_BY",
            Self::ResolvedBy => "RESOLVED_BY",
            Self::RelatedTo => "RELATED_TO",
            Self::FeedsInto => "FEEDS_INTO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sub_type_has_a_row() {
        let all = [
            SubType::Crane,
            SubType::Conveyor,
            SubType::Motor,
            SubType::Gearbox,
            SubType::Bearing,
            SubType::MechanicalFault,
            SubType::ElectricalFault,
            SubType::Vibration,
            SubType::Temperature,
            SubType::Noise,
            SubType::Inspection,
            SubType::Measurement,
            SubType::Repair,
            SubType::Replacement,
            SubType::SensorStream,
            SubType::HistorianQuery,
            SubType::Filter,
            SubType::FeatureExtraction,
            SubType::Aggregation,
            SubType::AnomalyDetector,
            SubType::WorldModel,
            SubType::Alert,
            SubType::Storage,
        ];
        assert_eq!(all.len(), SUBTYPES.len());
        for st in all {
            assert_eq!(st.spec().sub_type, st);
            assert!(st.size().width > 0.0 && st.size().height > 0.0);
        }
    }

    #[test]
    fn every_category_has_sub_types() {
        for cat in Category::ALL {
            assert!(cat.sub_types().count() > 0, "{cat:?} has no subtypes");
        }
    }

    #[test]
    fn sub_type_refines_its_category_only() {
        assert!(SubType::Crane.refines(Category::Equipment));
        assert!(!SubType::Crane.refines(Category::Fault));
        assert_eq!(SubType::WorldModel.category().editor(), EditorKind::Pipeline);
    }

    #[test]
    fn empty_config_fits_its_sub_type() {
        for spec in SUBTYPES {
            let config = NodeConfig::for_sub_type(spec.sub_type);
            assert!(config.fits(spec.sub_type));
        }
        assert!(!NodeConfig::empty(ConfigSchema::Sink).fits(SubType::Crane));
    }

    #[test]
    fn config_serializes_with_schema_tag() {
        let config = NodeConfig::Fault(FaultConfig {
            fault_code: "F-102".into(),
            severity: Severity::High,
        });
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["schema"], "fault");
        assert_eq!(json["faultCode"], "F-102");
        assert_eq!(json["severity"], "high");
    }

    #[test]
    fn relation_names_roundtrip() {
        for r in RelationType::ALL {
            assert_eq!(RelationType::from_name(r.name()), Some(r));
            let json = serde_json::to_string(&r).unwrap();
            assert_eq!(json, format!("\"{}\"", r.name()));
        }
        assert_eq!(RelationType::from_name("causes"), None);
    }

    #[test]
    fn pipeline_offers_only_data_flow() {
        assert_eq!(
            RelationType::offered_in(EditorKind::Pipeline),
            &[RelationType::FeedsInto]
        );
        assert!(!RelationType::offered_in(EditorKind::KnowledgeGraph).contains(&RelationType::FeedsInto));
    }

    #[test]
    fn id_prefix_is_snake_case() {
        assert_eq!(SubType::MechanicalFault.id_prefix(), "mechanical_fault");
    }
}
