use serde::{Deserialize, Serialize};

// 用户角色
//
// 前端历史代码中混用了法语与英语的角色字符串（admin / administrateur /
// professeur / professor ...），这里在会话边界统一归一化为封闭枚举。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Administrator, // 管理员
    Professor,     // 教师
    Parent,        // 家长
    Student,       // 学生
}

impl UserRole {
    pub const ADMINISTRATOR: &'static str = "administrator";
    pub const PROFESSOR: &'static str = "professor";
    pub const PARENT: &'static str = "parent";
    pub const STUDENT: &'static str = "student";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Administrator]
    }
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Administrator, &Self::Professor]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[
            &Self::Administrator,
            &Self::Professor,
            &Self::Parent,
            &Self::Student,
        ]
    }

    /// 将任意来源的角色字符串归一化
    pub fn normalize(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        let lowered = lowered.strip_prefix("role_").unwrap_or(&lowered);
        match lowered {
            "admin" | "administrateur" | "administrator" => Some(UserRole::Administrator),
            "professeur" | "professor" | "prof" | "teacher" | "enseignant" => {
                Some(UserRole::Professor)
            }
            "parent" => Some(UserRole::Parent),
            "eleve" | "élève" | "student" | "etudiant" | "étudiant" => {
                Some(UserRole::Student)
            }
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UserRole::normalize(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid user role: '{s}'. Supported roles: administrator, professor, parent, student"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Administrator => write!(f, "{}", UserRole::ADMINISTRATOR),
            UserRole::Professor => write!(f, "{}", UserRole::PROFESSOR),
            UserRole::Parent => write!(f, "{}", UserRole::PARENT),
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::normalize(s).ok_or_else(|| format!("Invalid user role: {s}"))
    }
}

/// 当前请求的会话上下文
///
/// 由 `RequireSession` 中间件在请求边界构造一次，之后通过请求扩展向下传递，
/// 并在每次调用 ScholChat 后端时携带其中的令牌。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: UserRole,
    pub user_id: String,
    pub user_name: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: UserRole, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role,
            user_id: user_id.into(),
            user_name: None,
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_normalization() {
        for raw in ["admin", "ADMIN", "Administrateur", " administrator ", "ROLE_ADMIN"] {
            assert_eq!(UserRole::normalize(raw), Some(UserRole::Administrator), "{raw}");
        }
        for raw in ["professeur", "Professor", "teacher"] {
            assert_eq!(UserRole::normalize(raw), Some(UserRole::Professor), "{raw}");
        }
        assert_eq!(UserRole::normalize("parent"), Some(UserRole::Parent));
        for raw in ["eleve", "élève", "student"] {
            assert_eq!(UserRole::normalize(raw), Some(UserRole::Student), "{raw}");
        }
        assert_eq!(UserRole::normalize("superuser"), None);
        assert_eq!(UserRole::normalize(""), None);
    }

    #[test]
    fn test_role_display_round_trips_through_normalize() {
        for role in UserRole::all_roles() {
            assert_eq!(UserRole::normalize(&role.to_string()), Some(**role));
        }
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let role: UserRole = serde_json::from_str("\"professeur\"").unwrap();
        assert_eq!(role, UserRole::Professor);
        assert!(serde_json::from_str::<UserRole>("\"janitor\"").is_err());
    }

    #[test]
    fn test_session_roles() {
        let session = Session::new("tok", UserRole::Professor, "42").with_user_name("M. Dupont");
        assert_eq!(session.role, UserRole::Professor);
        assert_eq!(session.user_name.as_deref(), Some("M. Dupont"));
    }
}
