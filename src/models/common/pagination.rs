use serde::{Deserialize, Serialize};

// 分页查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_string_to_usize"
    )]
    pub page: usize,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_usize")]
    pub size: Option<usize>,
}

// 分页响应信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl PaginationInfo {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size.max(1)),
        }
    }
}

// 自定义反序列化函数，支持字符串到 usize 的转换
//
// 查询参数在 `#[serde(flatten)]` 下会以字符串形式到达，需要手动解析
struct UsizeVisitor;

impl<'de> serde::de::Visitor<'de> for UsizeVisitor {
    type Value = usize;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a positive integer or a string containing one")
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        usize::try_from(value)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Unsigned(value), &self))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        usize::try_from(value)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        value
            .trim()
            .parse()
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(value), &self))
    }
}

fn deserialize_string_to_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(UsizeVisitor)
}

fn deserialize_optional_string_to_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(UsizeVisitor).map(Some)
}

fn default_page() -> usize {
    1
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: None,
        }
    }
}
