//! `${name}` placeholder substitution shared by hooks, commit and tag
//! messages, the changelog entry and release titles.
//!
//! Hook commands are rendered from trusted configuration only. Values such
//! as commit subjects are substituted verbatim and are not shell-escaped.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Named values available to templates
pub type Variables = BTreeMap<String, String>;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"))
}

/// Substitute every known `${name}`; unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &Variables) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_known_variables() {
        let v = vars(&[("version", "1.2.0"), ("tag_name", "v1.2.0")]);
        assert_eq!(
            render("chore: release ${version} (${tag_name})", &v),
            "chore: release 1.2.0 (v1.2.0)"
        );
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let v = vars(&[("version", "1.0.0")]);
        assert_eq!(render("${version} ${nope}", &v), "1.0.0 ${nope}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let v = vars(&[("changelog", "${version}"), ("version", "2.0.0")]);
        assert_eq!(render("${changelog}", &v), "${version}");
    }

    #[test]
    fn test_plain_dollar_untouched() {
        assert_eq!(render("echo $HOME ${", &Variables::new()), "echo $HOME ${");
    }
}
