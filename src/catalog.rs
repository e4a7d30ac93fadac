//! Immutable question bank and skill taxonomy.
//!
//! Both data sets are externally authored. They are fetched and parsed once
//! at startup; everything downstream holds the loaded [`Catalog`] by value,
//! so no assessment operation can run before the data resolves.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The closed set of professional tracks a learner can train for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    Embedded,
    Swe,
    MlDl,
    #[serde(rename = "genai")]
    GenAi,
    Coding,
}

impl RoleId {
    pub const ALL: [RoleId; 5] = [
        RoleId::Embedded,
        RoleId::Swe,
        RoleId::MlDl,
        RoleId::GenAi,
        RoleId::Coding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Swe => "swe",
            Self::MlDl => "ml_dl",
            Self::GenAi => "genai",
            Self::Coding => "coding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "embedded" => Some(Self::Embedded),
            "swe" => Some(Self::Swe),
            "ml_dl" => Some(Self::MlDl),
            "genai" => Some(Self::GenAi),
            "coding" => Some(Self::Coding),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question difficulty tier, serialized as its numeric tier (1..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Basic = 1,
    Intermediate = 2,
    Advanced = 3,
}

impl Difficulty {
    /// Difficulty-anchored base score used when grading an outcome.
    pub fn base_score(&self) -> f64 {
        match self {
            Self::Basic => 3.0,
            Self::Intermediate => 6.0,
            Self::Advanced => 8.0,
        }
    }

    /// Tier a learner at the given rating should be quizzed at.
    pub fn for_mean(mean: f64) -> Self {
        if mean < 4.0 {
            Self::Basic
        } else if mean < 7.0 {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Advanced),
            other => Err(format!("difficulty tier out of range: {other}")),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value as u8
    }
}

/// A single catalog entry. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub role: RoleId,
    pub domain: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub answer: usize,
    pub explanation: String,
}

/// One named skill domain within a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A role and its ordered set of domains. Domain order is the tie-break
/// order everywhere ratings are compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    pub id: RoleId,
    pub name: String,
    pub priority: i32,
    pub domains: Vec<DomainSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsTaxonomy {
    pub roles: Vec<RoleSpec>,
}

impl SkillsTaxonomy {
    pub fn role(&self, id: RoleId) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn domain(&self, role: RoleId, domain_id: &str) -> Option<&DomainSpec> {
        self.role(role)?.domains.iter().find(|d| d.id == domain_id)
    }

    /// Every (role, domain) pair, flattened in taxonomy order.
    pub fn pairs(&self) -> impl Iterator<Item = (RoleId, &DomainSpec)> {
        self.roles
            .iter()
            .flat_map(|r| r.domains.iter().map(move |d| (r.id, d)))
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Loaded question bank plus taxonomy, validated at the load boundary.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
    taxonomy: SkillsTaxonomy,
}

impl Catalog {
    /// Reads and parses both data files concurrently. This is the single
    /// asynchronous step of the whole core; everything after it is
    /// synchronous and in-memory.
    pub async fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        questions_path: P,
        taxonomy_path: Q,
    ) -> Result<Self> {
        let (question_bytes, taxonomy_bytes) = tokio::try_join!(
            tokio::fs::read(questions_path.as_ref()),
            tokio::fs::read(taxonomy_path.as_ref()),
        )?;

        let questions: Vec<Question> = serde_json::from_slice(&question_bytes)?;
        let taxonomy: SkillsTaxonomy = serde_json::from_slice(&taxonomy_bytes)?;

        let catalog = Self::from_parts(questions, taxonomy)?;
        tracing::info!(
            questions = catalog.questions.len(),
            roles = catalog.taxonomy.roles.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Builds a catalog from already-parsed records, validating that every
    /// question is answerable and belongs to a taxonomy domain.
    pub fn from_parts(questions: Vec<Question>, taxonomy: SkillsTaxonomy) -> Result<Self> {
        for q in &questions {
            if q.options.is_empty() {
                return Err(Error::Validation(format!("question {} has no options", q.id)));
            }
            if q.answer >= q.options.len() {
                return Err(Error::Validation(format!(
                    "question {} answer index {} out of range ({} options)",
                    q.id,
                    q.answer,
                    q.options.len()
                )));
            }
            if taxonomy.domain(q.role, &q.domain).is_none() {
                return Err(Error::Validation(format!(
                    "question {} references unknown domain {}/{}",
                    q.id,
                    q.role.as_str(),
                    q.domain
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                tracing::warn!(question = %q.id, "duplicate question id in catalog");
            }
        }

        Ok(Self { questions, taxonomy })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn taxonomy(&self) -> &SkillsTaxonomy {
        &self.taxonomy
    }

    /// Questions for a role, optionally narrowed to one domain.
    pub fn pool(&self, role: RoleId, domain: Option<&str>) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.role == role)
            .filter(|q| domain.map_or(true, |d| q.domain == d))
            .collect()
    }

    /// Number of catalog questions for a (role, domain) pair.
    pub fn pool_size(&self, role: RoleId, domain: &str) -> usize {
        self.pool(role, Some(domain)).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(id: &str) -> DomainSpec {
        DomainSpec {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            skills: vec![],
        }
    }

    fn taxonomy() -> SkillsTaxonomy {
        SkillsTaxonomy {
            roles: vec![RoleSpec {
                id: RoleId::Swe,
                name: "Software Engineering".to_string(),
                priority: 1,
                domains: vec![domain("algorithms"), domain("databases")],
            }],
        }
    }

    fn question(id: &str, domain: &str, difficulty: Difficulty) -> Question {
        Question {
            id: id.to_string(),
            role: RoleId::Swe,
            domain: domain.to_string(),
            difficulty,
            prompt: "?".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            answer: 0,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_role_id_serde_forms() {
        assert_eq!(serde_json::to_string(&RoleId::GenAi).unwrap(), "\"genai\"");
        assert_eq!(serde_json::to_string(&RoleId::MlDl).unwrap(), "\"ml_dl\"");
        let parsed: RoleId = serde_json::from_str("\"embedded\"").unwrap();
        assert_eq!(parsed, RoleId::Embedded);
    }

    #[test]
    fn test_role_id_parse_round_trip() {
        for role in RoleId::ALL {
            assert_eq!(RoleId::parse(role.as_str()), Some(role));
        }
        assert_eq!(RoleId::parse("devops"), None);
    }

    #[test]
    fn test_difficulty_numeric_serde() {
        let parsed: Difficulty = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Difficulty::Intermediate);
        assert_eq!(serde_json::to_string(&Difficulty::Advanced).unwrap(), "3");
        assert!(serde_json::from_str::<Difficulty>("4").is_err());
        assert!(serde_json::from_str::<Difficulty>("0").is_err());
    }

    #[test]
    fn test_difficulty_for_mean_thresholds() {
        assert_eq!(Difficulty::for_mean(1.0), Difficulty::Basic);
        assert_eq!(Difficulty::for_mean(3.9), Difficulty::Basic);
        assert_eq!(Difficulty::for_mean(4.0), Difficulty::Intermediate);
        assert_eq!(Difficulty::for_mean(6.9), Difficulty::Intermediate);
        assert_eq!(Difficulty::for_mean(7.0), Difficulty::Advanced);
        assert_eq!(Difficulty::for_mean(10.0), Difficulty::Advanced);
    }

    #[test]
    fn test_from_parts_rejects_bad_answer_index() {
        let mut q = question("q1", "algorithms", Difficulty::Basic);
        q.answer = 5;
        let err = Catalog::from_parts(vec![q], taxonomy()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_from_parts_rejects_unknown_domain() {
        let q = question("q1", "networking", Difficulty::Basic);
        let err = Catalog::from_parts(vec![q], taxonomy()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_pool_size() {
        let catalog = Catalog::from_parts(
            vec![
                question("q1", "algorithms", Difficulty::Basic),
                question("q2", "algorithms", Difficulty::Advanced),
                question("q3", "databases", Difficulty::Basic),
            ],
            taxonomy(),
        )
        .unwrap();

        assert_eq!(catalog.pool_size(RoleId::Swe, "algorithms"), 2);
        assert_eq!(catalog.pool_size(RoleId::Swe, "databases"), 1);
        assert_eq!(catalog.pool_size(RoleId::Embedded, "algorithms"), 0);
        assert_eq!(catalog.pool(RoleId::Swe, None).len(), 3);
    }

    #[test]
    fn test_taxonomy_pairs_order() {
        let tax = taxonomy();
        let pairs: Vec<_> = tax.pairs().map(|(r, d)| (r, d.id.clone())).collect();
        assert_eq!(
            pairs,
            vec![
                (RoleId::Swe, "algorithms".to_string()),
                (RoleId::Swe, "databases".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let qpath = dir.path().join("questions.json");
        let tpath = dir.path().join("taxonomy.json");

        let questions = vec![question("q1", "algorithms", Difficulty::Intermediate)];
        std::fs::write(&qpath, serde_json::to_vec(&questions).unwrap()).unwrap();
        std::fs::write(&tpath, serde_json::to_vec(&taxonomy()).unwrap()).unwrap();

        let catalog = Catalog::load(&qpath, &tpath).await.unwrap();
        assert_eq!(catalog.questions().len(), 1);
        assert_eq!(catalog.taxonomy().roles.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path().join("missing.json"), dir.path().join("also.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
