use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// 班级生命周期状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassState {
    EnAttenteApprobation, // 待审批（初始状态）
    Actif,                // 已激活
    Inactif,              // 已驳回或已停用
}

impl ClassState {
    pub const EN_ATTENTE_APPROBATION: &'static str = "EN_ATTENTE_APPROBATION";
    pub const ACTIF: &'static str = "ACTIF";
    pub const INACTIF: &'static str = "INACTIF";

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassState::EnAttenteApprobation => Self::EN_ATTENTE_APPROBATION,
            ClassState::Actif => Self::ACTIF,
            ClassState::Inactif => Self::INACTIF,
        }
    }
}

impl std::fmt::Display for ClassState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClassState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::EN_ATTENTE_APPROBATION => Ok(ClassState::EnAttenteApprobation),
            Self::ACTIF => Ok(ClassState::Actif),
            Self::INACTIF => Ok(ClassState::Inactif),
            _ => Err(format!("Invalid class state: {s}")),
        }
    }
}

/// 发布权限：谁可以在班级动态中发帖
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationRight {
    #[default]
    Tous,
    ModerateurSeulement,
    ParentsEtModerateur,
}

impl PublicationRight {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationRight::Tous => "TOUS",
            PublicationRight::ModerateurSeulement => "MODERATEUR_SEULEMENT",
            PublicationRight::ParentsEtModerateur => "PARENTS_ET_MODERATEUR",
        }
    }
}

impl std::fmt::Display for PublicationRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对其他实体的引用（机构、版主、学生、家长）
///
/// 后端有时返回完整对象，有时只返回 id，这里两种形式都接受。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
}

impl EntityRef {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nom: None,
            prenom: None,
        }
    }
}

impl<'de> Deserialize<'de> for EntityRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Full {
            #[serde(deserialize_with = "deserialize_id")]
            id: String,
            #[serde(default)]
            nom: Option<String>,
            #[serde(default)]
            prenom: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Full(Full),
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Full(full) => EntityRef {
                id: full.id,
                nom: full.nom,
                prenom: full.prenom,
            },
            Raw::Text(id) => EntityRef::from_id(id),
            Raw::Number(id) => EntityRef::from_id(id.to_string()),
        })
    }
}

/// 班级实体（后端 JSON 字段为 camelCase）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub nom: String,
    pub niveau: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date_creation: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_activation: Option<String>,
    pub etat: ClassState,
    #[serde(default)]
    pub etablissement: Option<EntityRef>,
    #[serde(default)]
    pub moderator: Option<EntityRef>,
    #[serde(default)]
    pub droit_publication: PublicationRight,
    #[serde(default, deserialize_with = "deserialize_refs")]
    pub eleves: Vec<EntityRef>,
    #[serde(default, deserialize_with = "deserialize_refs")]
    pub parents: Vec<EntityRef>,
}

impl ClassEntity {
    pub fn etablissement_id(&self) -> Option<&str> {
        self.etablissement.as_ref().map(|e| e.id.as_str())
    }

    pub fn etablissement_nom(&self) -> Option<&str> {
        self.etablissement.as_ref().and_then(|e| e.nom.as_deref())
    }

    pub fn moderator_id(&self) -> Option<&str> {
        self.moderator.as_ref().map(|m| m.id.as_str())
    }
}

/// 激活历史记录（后端维护，只读）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivationHistoryRecord {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub classe_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub utilisateur_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub date_activation: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub date_desactivation: Option<DateTime<Utc>>,
    #[serde(default)]
    pub motif: Option<String>,
    #[serde(default)]
    pub commentaire: Option<String>,
}

// 后端 id 可能是数字也可能是字符串（UUID），统一转为字符串
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(id) => Ok(id),
        RawId::Number(id) => Ok(id.to_string()),
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id")] String);

    Option::<Wrapper>::deserialize(deserializer).map(|opt| opt.map(|w| w.0))
}

fn deserialize_refs<'de, D>(deserializer: D) -> Result<Vec<EntityRef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<EntityRef>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// 解析后端时间戳：RFC 3339、无时区的本地时间（按 UTC 处理）或纯日期
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: '{raw}'")))
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: '{raw}'"))),
        None => Ok(None),
    }
}
