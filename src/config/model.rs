//! Typed view of `config.json`.
//!
//! The structs mirror the configuration sections so actions never re-check key
//! presence on their own. Named sections are [`Section`]s, which keep entries
//! in the order the file declares them; listings, directory plans and card
//! walks follow that order.

use crate::config::loader::ConfigDocument;
use anyhow::{Context, Result, anyhow, bail};
use serde::de::{DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;
use std::path::PathBuf;

#[derive(Clone, Debug)]
/// Fully typed configuration used by every action except `validate-config`.
pub struct Config {
    pub paths: Paths,
    pub generators: Section<Generator>,
    pub campaigns: Section<Campaign>,
    pub physics_processes: Vec<String>,
    pub tunes: Section<String>,
    pub parton_showers: Section<PartonShower>,
    pub dataset_schema: Option<DatasetSchema>,
}

#[derive(Clone, Debug, PartialEq)]
/// Name-keyed configuration section in declaration order.
pub struct Section<T> {
    entries: Vec<(String, T)>,
}

impl<T> Section<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entry names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, T)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> FromIterator<(String, T)> for Section<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Section<T> {
    type Item = &'a (String, T);
    type IntoIter = std::slice::Iter<'a, (String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T> Index<&str> for Section<T> {
    type Output = T;

    fn index(&self, name: &str) -> &T {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no entry named {name:?} in section"),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Section<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SectionVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for SectionVisitor<T> {
            type Value = Section<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by name")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Section<T>, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(Section { entries })
            }
        }

        deserializer.deserialize_map(SectionVisitor(PhantomData))
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Named filesystem roots.
pub struct Paths {
    pub cards_dir: PathBuf,
    pub campaigns_dir: PathBuf,
    pub fragments_dir: PathBuf,
    pub skeletons_dir: PathBuf,
    pub eos_base_path: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
/// Event generator plus the skeleton templates used to seed its cards.
pub struct Generator {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skeleton_files: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub tune: Option<String>,
    #[serde(default)]
    pub beam: Option<Beam>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
/// Beam energy in GeV, written either as a JSON number or a string.
pub enum Beam {
    Energy(Number),
    Label(String),
}

impl fmt::Display for Beam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Beam::Energy(value) => write!(f, "{value}"),
            Beam::Label(value) => f.write_str(value),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PartonShower {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Attribute contract for per-dataset cards.
///
/// Only the attribute names matter for card checks; the per-attribute specs
/// are kept verbatim for tooling that wants to display them.
pub struct DatasetSchema {
    #[serde(default)]
    pub mandatory_attributes: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub optional_attributes: Option<BTreeMap<String, Value>>,
}

impl DatasetSchema {
    /// Reduce the schema to its mandatory and optional key sets.
    pub fn attribute_schema(&self) -> Result<AttributeSchema> {
        let mandatory = self
            .mandatory_attributes
            .as_ref()
            .ok_or_else(|| anyhow!("dataset_schema missing 'mandatory_attributes'"))?;
        let optional = self
            .optional_attributes
            .as_ref()
            .ok_or_else(|| anyhow!("dataset_schema missing 'optional_attributes'"))?;
        Ok(AttributeSchema {
            mandatory: mandatory.keys().cloned().collect(),
            optional: optional.keys().cloned().collect(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Mandatory and optional attribute names a card may carry.
pub struct AttributeSchema {
    pub mandatory: BTreeSet<String>,
    pub optional: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Outcome of comparing a card's keys with an [`AttributeSchema`].
pub struct AttributeDiff {
    /// Mandatory attributes the card does not set.
    pub missing: BTreeSet<String>,
    /// Attributes that are neither mandatory nor optional.
    pub unknown: BTreeSet<String>,
}

impl AttributeSchema {
    pub fn new<M, O, S>(mandatory: M, optional: O) -> Self
    where
        M: IntoIterator<Item = S>,
        O: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mandatory: mandatory.into_iter().map(Into::into).collect(),
            optional: optional.into_iter().map(Into::into).collect(),
        }
    }

    /// `missing = mandatory - present`, `unknown = present - mandatory - optional`.
    pub fn compare(&self, present: &BTreeSet<String>) -> AttributeDiff {
        AttributeDiff {
            missing: self.mandatory.difference(present).cloned().collect(),
            unknown: present
                .iter()
                .filter(|key| !self.mandatory.contains(*key) && !self.optional.contains(*key))
                .cloned()
                .collect(),
        }
    }
}

impl Config {
    /// Project a raw document onto the typed sections.
    ///
    /// Sections are read one at a time so a failure names the section that
    /// is missing or malformed.
    pub fn from_document(document: &ConfigDocument) -> Result<Self> {
        let physics_processes = optional_section::<ProcessList>(document, "physics_processes")?
            .map(ProcessList::into_names)
            .unwrap_or_default();
        Ok(Self {
            paths: required_section(document, "paths")?,
            generators: required_section(document, "generators")?,
            campaigns: required_section(document, "campaigns")?,
            physics_processes,
            tunes: required_section(document, "tunes")?,
            parton_showers: required_section(document, "parton_showers")?,
            dataset_schema: optional_section(document, "dataset_schema")?,
        })
    }

    /// Look up a generator, failing with the name when it is not configured.
    pub fn generator(&self, name: &str) -> Result<&Generator> {
        match self.generators.get(name) {
            Some(generator) => Ok(generator),
            None => bail!("Unknown generator: {name}"),
        }
    }

    /// Import path for a named tune.
    pub fn tune_import(&self, name: &str) -> Result<&str> {
        match self.tunes.get(name) {
            Some(import) => Ok(import.as_str()),
            None => bail!("Unknown tune: {name}"),
        }
    }

    pub fn campaign(&self, name: &str) -> Result<&Campaign> {
        match self.campaigns.get(name) {
            Some(campaign) => Ok(campaign),
            None => bail!("Unknown campaign: {name}"),
        }
    }
}

fn required_section<T: DeserializeOwned>(document: &ConfigDocument, key: &str) -> Result<T> {
    match optional_section(document, key)? {
        Some(value) => Ok(value),
        None => bail!(
            "{} is missing required section '{key}' (run --action validate-config for details)",
            document.path.display()
        ),
    }
}

fn optional_section<T: DeserializeOwned>(
    document: &ConfigDocument,
    key: &str,
) -> Result<Option<T>> {
    let Some(value) = document.section(key) else {
        return Ok(None);
    };
    serde_json::from_value(value.clone())
        .map(Some)
        .with_context(|| format!("invalid section '{key}' in {}", document.path.display()))
}

/// `physics_processes` is either an array of names or an object keyed by
/// process name.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProcessList {
    Names(Vec<String>),
    Table(Map<String, Value>),
}

impl ProcessList {
    fn into_names(self) -> Vec<String> {
        match self {
            ProcessList::Names(names) => names,
            ProcessList::Table(table) => table.into_iter().map(|(name, _)| name).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> ConfigDocument {
        ConfigDocument::from_value("config.json", value).expect("object config")
    }

    fn minimal() -> Value {
        json!({
            "paths": {
                "cards_dir": "cards",
                "campaigns_dir": "campaigns",
                "fragments_dir": "fragments",
                "skeletons_dir": "skeletons",
                "eos_base_path": "/eos/gridpacks"
            },
            "generators": {
                "madgraph": {"description": "MadGraph5_aMC@NLO", "skeleton_files": ["skeleton_proc_card.dat"]}
            },
            "campaigns": {
                "Run3Summer23": {"tune": "CP5", "beam": 6800},
                "Run2UL18": {"tune": "CP5", "beam": "6500"}
            },
            "physics_processes": ["ttbar", "wjets"],
            "tunes": {"CP5": "Configuration.Generator.MCTunesRun3ECM13p6TeV.PythiaCP5Settings_cfi"},
            "parton_showers": {"pythia8": {"description": "Pythia 8"}}
        })
    }

    #[test]
    fn typed_projection_reads_every_section() {
        let config = Config::from_document(&document(minimal())).expect("typed config");
        assert_eq!(config.paths.cards_dir, PathBuf::from("cards"));
        assert_eq!(
            config.generators["madgraph"].skeleton_files,
            vec!["skeleton_proc_card.dat".to_string()]
        );
        assert_eq!(config.physics_processes, vec!["ttbar", "wjets"]);
        assert_eq!(
            config.campaigns["Run3Summer23"].beam.as_ref().map(ToString::to_string),
            Some("6800".to_string())
        );
        assert_eq!(
            config.campaigns["Run2UL18"].beam,
            Some(Beam::Label("6500".to_string()))
        );
        assert!(config.dataset_schema.is_none());
    }

    #[test]
    fn process_table_keys_become_names() {
        let mut value = minimal();
        value["physics_processes"] = json!({"dy": {}, "ttbar": {"xsec": 1.0}});
        let config = Config::from_document(&document(value)).expect("typed config");
        let mut names = config.physics_processes.clone();
        names.sort();
        assert_eq!(names, vec!["dy", "ttbar"]);
    }

    #[test]
    fn missing_path_key_is_a_load_error() {
        let mut value = minimal();
        value["paths"].as_object_mut().unwrap().remove("skeletons_dir");
        let err = Config::from_document(&document(value)).expect_err("incomplete paths");
        assert!(format!("{err:#}").contains("skeletons_dir"));
    }

    #[test]
    fn lookups_name_the_unknown_entry() {
        let config = Config::from_document(&document(minimal())).expect("typed config");
        assert!(config.tune_import("CP5").unwrap().ends_with("PythiaCP5Settings_cfi"));
        assert_eq!(
            config.tune_import("CP1").unwrap_err().to_string(),
            "Unknown tune: CP1"
        );
        assert_eq!(config.campaign("Run3Summer23").unwrap().tune.as_deref(), Some("CP5"));
        assert_eq!(
            config.campaign("Run4").unwrap_err().to_string(),
            "Unknown campaign: Run4"
        );
        assert_eq!(
            config.generator("sherpa").unwrap_err().to_string(),
            "Unknown generator: sherpa"
        );
    }

    #[test]
    fn compare_splits_missing_and_unknown() {
        let schema = AttributeSchema::new(["a", "b"], ["c"]);
        let present: BTreeSet<String> = ["a", "c"].iter().map(|s| s.to_string()).collect();
        let diff = schema.compare(&present);
        assert_eq!(diff.missing, BTreeSet::from(["b".to_string()]));
        assert!(diff.unknown.is_empty());

        let present: BTreeSet<String> = ["a", "b", "x"].iter().map(|s| s.to_string()).collect();
        let diff = schema.compare(&present);
        assert!(diff.missing.is_empty());
        assert_eq!(diff.unknown, BTreeSet::from(["x".to_string()]));
    }

    #[test]
    fn attribute_schema_requires_both_sections() {
        let schema = DatasetSchema {
            mandatory_attributes: Some(BTreeMap::new()),
            optional_attributes: None,
        };
        let err = schema.attribute_schema().expect_err("optional section missing");
        assert!(err.to_string().contains("optional_attributes"));
    }

    #[test]
    fn sections_keep_declaration_order() {
        let mut value = minimal();
        value["generators"] = json!({
            "sherpa": {"description": "Sherpa"},
            "madgraph": {"description": "MadGraph5_aMC@NLO"},
            "herwig": {}
        });
        let config = Config::from_document(&document(value)).expect("typed config");
        assert_eq!(
            config.generators.names().collect::<Vec<_>>(),
            vec!["sherpa", "madgraph", "herwig"]
        );
        assert_eq!(config.generators.len(), 3);
        assert!(config.generators.contains("herwig"));
        assert!(config.generators["herwig"].description.is_none());
    }

    #[test]
    fn missing_section_is_named_in_the_error() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("tunes");
        let err = Config::from_document(&document(value)).expect_err("tunes missing");
        assert!(err.to_string().contains("missing required section 'tunes'"));

        let mut value = minimal();
        value["generators"] = json!(["madgraph"]);
        let err = Config::from_document(&document(value)).expect_err("generators malformed");
        assert!(err.to_string().starts_with("invalid section 'generators'"));
    }
}
