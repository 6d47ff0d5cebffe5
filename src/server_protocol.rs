use serde_json::Value;

use crate::engine::Signal;
use crate::types::{Direction, ItemKind};

#[derive(Debug)]
pub enum ParsedClientMessage {
    /// Raw keyboard symbol; unmapped keys are accepted and ignored later.
    Key { key: String },
    Dir { dir: Direction },
    Signal { signal: Signal },
    Ping { t: f64 },
}

pub fn parse_signal(value: &str) -> Option<Signal> {
    match value {
        "init" | "initialize" => Some(Signal::Initialize),
        "reset" => Some(Signal::Reset),
        "automate" | "set_automation_rounds" => Some(Signal::SetAutomationRounds),
        "tick" => Some(Signal::Tick),
        _ => None,
    }
}

/// Glyph rows into an item grid. Any unknown glyph rejects the whole grid.
pub fn parse_item_rows(value: &Value) -> Option<Vec<Vec<ItemKind>>> {
    value
        .as_array()?
        .iter()
        .map(|row| {
            row.as_str()?
                .chars()
                .map(ItemKind::from_glyph)
                .collect::<Option<Vec<_>>>()
        })
        .collect()
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "key" => {
            let key = object.get("key")?.as_str()?.to_string();
            Some(ParsedClientMessage::Key { key })
        }
        "dir" => {
            let dir = Direction::parse(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Dir { dir })
        }
        "signal" => {
            let signal = parse_signal(object.get("signal")?.as_str()?)?;
            Some(ParsedClientMessage::Signal { signal })
        }
        "replace_items" => {
            let rows = parse_item_rows(object.get("rows")?)?;
            Some(ParsedClientMessage::Signal {
                signal: Signal::ReplaceItems(rows),
            })
        }
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_message() {
        let parsed = parse_client_message(r#"{"type":"key","key":"ArrowUp"}"#);
        match parsed {
            Some(ParsedClientMessage::Key { key }) => assert_eq!(key, "ArrowUp"),
            other => panic!("expected key message, got {other:?}"),
        }
    }

    #[test]
    fn parse_dir_rejects_unknown_direction() {
        assert!(parse_client_message(r#"{"type":"dir","dir":"sideways"}"#).is_none());
        assert!(matches!(
            parse_client_message(r#"{"type":"dir","dir":"left"}"#),
            Some(ParsedClientMessage::Dir {
                dir: Direction::Left
            })
        ));
    }

    #[test]
    fn parse_signal_names() {
        assert!(matches!(
            parse_client_message(r#"{"type":"signal","signal":"automate"}"#),
            Some(ParsedClientMessage::Signal {
                signal: Signal::SetAutomationRounds
            })
        ));
        assert_eq!(parse_signal("init"), Some(Signal::Initialize));
        assert_eq!(parse_signal("reset"), Some(Signal::Reset));
        assert_eq!(parse_signal("tick"), Some(Signal::Tick));
        assert_eq!(parse_signal("explode"), None);
    }

    #[test]
    fn parse_replace_items_rows() {
        let parsed = parse_client_message(r##"{"type":"replace_items","rows":["#.o","% #"]}"##);
        match parsed {
            Some(ParsedClientMessage::Signal {
                signal: Signal::ReplaceItems(rows),
            }) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0], vec![ItemKind::Wall, ItemKind::Biscuit, ItemKind::Pill]);
                assert_eq!(rows[1][0], ItemKind::Cherry);
            }
            other => panic!("expected replace_items, got {other:?}"),
        }
        assert!(parse_client_message(r##"{"type":"replace_items","rows":["#?"]}"##).is_none());
        assert!(parse_client_message(r##"{"type":"replace_items","rows":"#"}"##).is_none());
    }

    #[test]
    fn unknown_or_malformed_messages_are_rejected() {
        assert!(parse_client_message("not json").is_none());
        assert!(parse_client_message(r#"{"type":"teleport"}"#).is_none());
        assert!(parse_client_message(r#"{"kind":"tick"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"ping","t":"soon"}"#).is_none());
        assert!(matches!(
            parse_client_message(r#"{"type":"ping","t":12.5}"#),
            Some(ParsedClientMessage::Ping { .. })
        ));
    }
}
