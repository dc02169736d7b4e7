//! 声明式工具描述：显式名称、用途、带类型的参数表与返回约定
//!
//! 无状态的演示工具直接由 ToolDescriptor + 处理函数构成；读库的工具自己实现 Tool，
//! 但同样用 ParamSpec 生成参数 schema 并校验入参。

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::tools::Tool;

/// 参数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    StringList,
    Object,
}

impl ParamKind {
    fn json_schema(&self) -> Value {
        match self {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Integer => json!({ "type": "integer" }),
            ParamKind::Number => json!({ "type": "number" }),
            ParamKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            ParamKind::Object => json!({ "type": "object" }),
        }
    }

    /// 校验并规范化：整数/数字接受数字字符串（模型常把 id 写成字符串）
    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ParamKind::String, Value::String(_)) => Some(value.clone()),
            (ParamKind::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ParamKind::Integer, Value::Number(n)) if n.is_i64() => Some(value.clone()),
            (ParamKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (ParamKind::Number, Value::Number(_)) => Some(value.clone()),
            (ParamKind::Number, Value::String(s)) => s.trim().parse::<f64>().ok().map(Value::from),
            (ParamKind::StringList, Value::Array(items)) if items.iter().all(Value::is_string) => {
                Some(value.clone())
            }
            (ParamKind::Object, Value::Object(_)) => Some(value.clone()),
            _ => None,
        }
    }
}

/// 单个参数声明
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }
}

/// 由参数表生成 JSON Schema
pub fn params_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for p in params {
        let mut schema = p.kind.json_schema();
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".to_string(), Value::String(p.description.to_string()));
        }
        properties.insert(p.name.to_string(), schema);
    }
    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// 校验后的参数
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    /// 按参数表校验：缺少必填参数或类型不符时返回错误；未声明的参数被丢弃
    pub fn validate(params: &[ParamSpec], args: &Value) -> Result<Self, String> {
        let empty = Map::new();
        let given = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => return Err(format!("arguments must be a JSON object, got {other}")),
        };
        let mut out = Map::new();
        for p in params {
            match given.get(p.name).filter(|v| !v.is_null()) {
                Some(v) => {
                    let coerced = p.kind.coerce(v).ok_or_else(|| {
                        format!("argument '{}' has the wrong type (expected {:?})", p.name, p.kind)
                    })?;
                    out.insert(p.name.to_string(), coerced);
                }
                None if p.required => {
                    return Err(format!("missing required argument '{}'", p.name));
                }
                None => {}
            }
        }
        Ok(Self(out))
    }

    pub fn str(&self, name: &str) -> &str {
        self.0.get(name).and_then(Value::as_str).unwrap_or("")
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> i64 {
        self.0.get(name).and_then(Value::as_i64).unwrap_or_default()
    }

    pub fn number(&self, name: &str) -> f64 {
        self.0.get(name).and_then(Value::as_f64).unwrap_or_default()
    }

    pub fn list(&self, name: &str) -> Vec<&str> {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn object(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }
}

/// 处理函数：输入已校验参数，返回工具结果文本
pub type ToolHandler = fn(&ToolArgs) -> String;

/// 无状态工具的完整描述
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    /// 返回内容说明（拼到描述后，供模型理解）
    pub returns: &'static str,
    pub handler: ToolHandler,
    full_description: String,
}

impl ToolDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        params: Vec<ParamSpec>,
        returns: &'static str,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            description,
            params,
            returns,
            handler,
            full_description: format!("{description} Returns: {returns}"),
        }
    }
}

#[async_trait]
impl Tool for ToolDescriptor {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        &self.full_description
    }

    fn parameters_schema(&self) -> Value {
        params_schema(&self.params)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(&self.params, &args)?;
        Ok((self.handler)(&args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &[ParamSpec] = &[
        ParamSpec::required("email", ParamKind::String, "Employee email"),
        ParamSpec::required("adjustment", ParamKind::Integer, "Hours to add"),
        ParamSpec::optional("tags", ParamKind::StringList, "Tags"),
    ];

    fn handler(args: &ToolArgs) -> String {
        format!("{} {} {}", args.str("email"), args.int("adjustment"), args.list("tags").join("|"))
    }

    #[test]
    fn test_schema_lists_required_params() {
        let schema = params_schema(PARAMS);
        assert_eq!(schema["required"], json!(["email", "adjustment"]));
        assert_eq!(schema["properties"]["tags"]["type"], "array");
    }

    #[tokio::test]
    async fn test_descriptor_validates_and_coerces() {
        let tool = ToolDescriptor::new("update", "Update.", PARAMS.to_vec(), "A confirmation.", handler);
        let out = tool
            .execute(json!({"email": "a@b.c", "adjustment": "8", "tags": ["x", "y"]}))
            .await
            .unwrap();
        assert_eq!(out, "a@b.c 8 x|y");

        let err = tool.execute(json!({"email": "a@b.c"})).await.unwrap_err();
        assert!(err.contains("adjustment"));
        let err = tool
            .execute(json!({"email": "a@b.c", "adjustment": "eight"}))
            .await
            .unwrap_err();
        assert!(err.contains("wrong type"));
        assert!(tool.description().ends_with("Returns: A confirmation."));
    }
}
