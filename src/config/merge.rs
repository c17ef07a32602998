//! Layer merging on TOML trees.
//!
//! Tables merge recursively; arrays and scalars from a later layer replace
//! the earlier value wholesale.

use toml::{Table, Value};

/// Merge `overlay` into `base` in place
pub fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Merge layers in order, lowest precedence first
pub fn merge_layers<I>(layers: I) -> Table
where
    I: IntoIterator<Item = Table>,
{
    let mut merged = Table::new();
    for layer in layers {
        deep_merge(&mut merged, layer);
    }
    merged
}

/// Set a value at a dotted key path, creating intermediate tables
pub fn set_path(table: &mut Table, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = table;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

/// Look up a value at a dotted key path
pub fn get_path<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = table.get(first)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Table {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_nested_tables_merge() {
        let mut base = table("[git]\nremote = \"origin\"\nrequire_clean = true\n");
        deep_merge(&mut base, table("[git]\nrequire_clean = false\n"));
        assert_eq!(get_path(&base, "git.remote").unwrap().as_str(), Some("origin"));
        assert_eq!(get_path(&base, "git.require_clean").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn test_arrays_replace_instead_of_concatenating() {
        let mut base = table("[git]\npush_args = [\"--follow-tags\", \"--atomic\"]\n");
        deep_merge(&mut base, table("[git]\npush_args = [\"--no-verify\"]\n"));
        let args = get_path(&base, "git.push_args").unwrap().as_array().unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].as_str(), Some("--no-verify"));
    }

    #[test]
    fn test_merge_is_associative_per_key() {
        let defaults = table("dry_run = false\n[tag]\nprefix = \"v\"\nannotation = \"a\"\n");
        let file = table("[tag]\nprefix = \"release-\"\n");
        let env = table("dry_run = true\n");
        let argv = table("[tag]\nprefix = \"cli-\"\n");

        let stepwise = {
            let mut first = merge_layers([defaults.clone(), file.clone()]);
            deep_merge(&mut first, env.clone());
            deep_merge(&mut first, argv.clone());
            first
        };
        let one_pass = merge_layers([defaults, file, env, argv]);

        assert_eq!(stepwise, one_pass);
        assert_eq!(get_path(&one_pass, "tag.prefix").unwrap().as_str(), Some("cli-"));
        assert_eq!(get_path(&one_pass, "tag.annotation").unwrap().as_str(), Some("a"));
    }

    #[test]
    fn test_set_path_creates_tables() {
        let mut base = Table::new();
        set_path(&mut base, "workflow.git_flow", Value::Boolean(false));
        assert_eq!(
            get_path(&base, "workflow.git_flow").unwrap().as_bool(),
            Some(false)
        );
    }

    #[test]
    fn test_scalar_replaced_by_table() {
        let mut base = table("changelog = false\n");
        deep_merge(&mut base, table("[changelog]\nenabled = true\n"));
        assert!(get_path(&base, "changelog.enabled").is_some());
    }
}
