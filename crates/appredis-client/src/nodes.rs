//! Cluster startup node parsing.

use serde_json::Value;

use crate::error::{ExtensionError, ExtensionResult};

/// Parse the `REDIS_NODES` setting into connection URLs.
///
/// Falsy values mean "no cluster" and yield `None`: missing, `null`,
/// `false`, zero, and an empty string, list or table. Accepted shapes:
///
/// - a list of URLs (`"redis://10.0.0.1:7000"`) or `"host:port"` strings
/// - a list of `{ host, port }` tables
/// - a single comma-separated string
pub fn parse_startup_nodes(value: Option<&Value>) -> ExtensionResult<Option<Vec<String>>> {
    let nodes: Vec<String> = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return Ok(None),
        Some(Value::Object(table)) if table.is_empty() => return Ok(None),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(node_url)
            .collect(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(parse_entry)
            .collect::<ExtensionResult<Vec<_>>>()?,
        Some(other) => {
            return Err(ExtensionError::InvalidNodes(format!(
                "expected a list of nodes, found `{other}`"
            )));
        }
    };

    Ok(if nodes.is_empty() { None } else { Some(nodes) })
}

fn parse_entry(entry: &Value) -> ExtensionResult<String> {
    match entry {
        Value::String(s) if !s.trim().is_empty() => Ok(node_url(s.trim())),
        Value::Object(table) => {
            let host = table
                .get("host")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid_entry(entry))?;
            let port = match table.get("port") {
                Some(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|p| u16::try_from(p).ok())
                    .map(|p| p.to_string()),
                Some(Value::String(s)) => s.trim().parse::<u16>().ok().map(|p| p.to_string()),
                None => Some("6379".to_string()),
                _ => None,
            }
            .ok_or_else(|| invalid_entry(entry))?;
            Ok(format!("redis://{host}:{port}"))
        }
        _ => Err(invalid_entry(entry)),
    }
}

fn node_url(node: &str) -> String {
    if node.contains("://") {
        node.to_string()
    } else {
        format!("redis://{node}")
    }
}

fn invalid_entry(entry: &Value) -> ExtensionError {
    ExtensionError::InvalidNodes(format!("unsupported node entry `{entry}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values_mean_no_cluster() {
        assert_eq!(parse_startup_nodes(None).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!(null))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!(false))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!(0))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!(0.0))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!({}))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!(""))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!([]))).expect("ok"), None);
        assert_eq!(parse_startup_nodes(Some(&json!(" , "))).expect("ok"), None);
    }

    #[test]
    fn test_url_list_is_kept() {
        let value = json!(["redis://10.0.0.1:7000", "rediss://10.0.0.2:7001"]);
        assert_eq!(
            parse_startup_nodes(Some(&value)).expect("ok"),
            Some(vec![
                "redis://10.0.0.1:7000".to_string(),
                "rediss://10.0.0.2:7001".to_string(),
            ])
        );
    }

    #[test]
    fn test_host_port_forms() {
        let value = json!([
            "10.0.0.1:7000",
            { "host": "10.0.0.2", "port": 7001 },
            { "host": "10.0.0.3", "port": "7002" },
            { "host": "10.0.0.4" }
        ]);
        assert_eq!(
            parse_startup_nodes(Some(&value)).expect("ok"),
            Some(vec![
                "redis://10.0.0.1:7000".to_string(),
                "redis://10.0.0.2:7001".to_string(),
                "redis://10.0.0.3:7002".to_string(),
                "redis://10.0.0.4:6379".to_string(),
            ])
        );
    }

    #[test]
    fn test_comma_separated_string() {
        let value = json!("a:7000, b:7001");
        assert_eq!(
            parse_startup_nodes(Some(&value)).expect("ok"),
            Some(vec!["redis://a:7000".to_string(), "redis://b:7001".to_string()])
        );
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            parse_startup_nodes(Some(&json!(true))),
            Err(ExtensionError::InvalidNodes(_))
        ));
        assert!(matches!(
            parse_startup_nodes(Some(&json!(7000))),
            Err(ExtensionError::InvalidNodes(_))
        ));
        assert!(matches!(
            parse_startup_nodes(Some(&json!({ "host": "10.0.0.1" }))),
            Err(ExtensionError::InvalidNodes(_))
        ));
        assert!(matches!(
            parse_startup_nodes(Some(&json!([42]))),
            Err(ExtensionError::InvalidNodes(_))
        ));
        assert!(matches!(
            parse_startup_nodes(Some(&json!([{ "port": 7000 }]))),
            Err(ExtensionError::InvalidNodes(_))
        ));
    }
}
