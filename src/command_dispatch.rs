//! Purpose: Hold top-level CLI command dispatch for `cfgparser`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command emits exactly one JSON document on success.
//! Invariants: Lookup failures surface as typed errors; nothing is printed on failure.

use super::*;

use cfgparser::api::{Value, evaluate, split, split_evaluated};

pub(super) fn dispatch_command(command: Command, cfg: &CfgParser) -> Result<RunOutcome, Error> {
    match command {
        Command::Categories => {
            emit_json(json!({ "categories": cfg.categories() }));
            Ok(RunOutcome::ok())
        }
        Command::Sections { category } => {
            let sections = cfg.sections(category.as_deref())?;
            let mut out = Map::new();
            if let Some(category) = category {
                out.insert("category".to_string(), json!(category));
            }
            out.insert("sections".to_string(), json!(sections));
            emit_json(JsonValue::Object(out));
            Ok(RunOutcome::ok())
        }
        Command::Options { section, category } => {
            let key = section_key(&section, category.as_deref());
            let options = cfg.options(key)?;
            emit_json(json!({ "section": section, "options": options }));
            Ok(RunOutcome::ok())
        }
        Command::Items { section, category } => {
            let key = section_key(&section, category.as_deref());
            let items = cfg
                .items(key)?
                .into_iter()
                .map(|(option, value)| json!({ "option": option, "value": value }))
                .collect::<Vec<_>>();
            emit_json(json!({ "section": section, "items": items }));
            Ok(RunOutcome::ok())
        }
        Command::Get {
            section,
            option,
            category,
            eval,
            list,
            default,
        } => {
            let key = section_key(&section, category.as_deref());
            let value = get_value(cfg, key, &option, eval, list, default.as_deref())?;
            emit_json(json!({ "section": section, "option": option, "value": value }));
            Ok(RunOutcome::ok())
        }
    }
}

fn get_value(
    cfg: &CfgParser,
    key: SectionKey<'_>,
    option: &str,
    eval: bool,
    list: bool,
    default: Option<&str>,
) -> Result<JsonValue, Error> {
    let value = match (list, eval, default) {
        (false, false, None) => json!(cfg.get(key, option)?),
        (false, false, Some(default)) => json!(cfg.get_or(key, option, default)?),
        (false, true, None) => cfg.get_eval(key, option)?.to_json(),
        (false, true, Some(default)) => cfg.get_eval_or(key, option, evaluate(default))?.to_json(),
        (true, false, None) => json!(cfg.get_list(key, option)?),
        (true, false, Some(default)) => json!(cfg.get_list_or(key, option, split(default))?),
        (true, true, None) => values_json(cfg.get_list_eval(key, option)?),
        (true, true, Some(default)) => {
            values_json(cfg.get_list_eval_or(key, option, split_evaluated(default))?)
        }
    };
    Ok(value)
}

fn values_json(values: Vec<Value>) -> JsonValue {
    JsonValue::Array(values.iter().map(Value::to_json).collect())
}
