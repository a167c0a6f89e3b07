//! Canonical repository URLs.
//!
//! Package manifests spell their repository in many dialects (`git+ssh://`,
//! scp-like `git@host:path`, `github:` shorthands, bare `owner/repo`). All of
//! them collapse to one `https://host/path` form so reports diff cleanly
//! between runs. Unrecognized input passes through unchanged.

use serde_json::Value;

/// Canonicalize a manifest `repository` / `homepage` field: either a string
/// or an object carrying a string `url`. Any other shape yields `None`.
pub fn canonicalize(field: &Value) -> Option<String> {
    match field {
        Value::String(url) => canonicalize_url(url),
        Value::Object(map) => map.get("url").and_then(Value::as_str).and_then(canonicalize_url),
        _ => None,
    }
}

/// Canonicalize a raw repository URL. Empty input yields `None`.
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (base, fragment) = match raw.find('#') {
        Some(i) => raw.split_at(i),
        None => (raw, ""),
    };
    let base = base.strip_prefix("git+").unwrap_or(base);

    let mut url = normalize_dialect(base);
    // A trailing `/` may sit on either side of `.git`
    strip_trailing_slash(&mut url);
    let git_suffix = url
        .len()
        .checked_sub(4)
        .and_then(|i| url.get(i..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(".git"));
    if git_suffix {
        url.truncate(url.len() - 4);
    }
    strip_trailing_slash(&mut url);

    url.push_str(fragment);
    Some(url)
}

fn strip_trailing_slash(url: &mut String) {
    if url.ends_with('/') {
        url.pop();
    }
}

fn normalize_dialect(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("github:") {
        return format!("https://github.com/{}", rest);
    }
    if let Some(rest) = base.strip_prefix("git://") {
        return format!("https://{}", rest);
    }
    if let Some(rest) = base.strip_prefix("ssh://") {
        return format!("https://{}", ssh_host_path(strip_user(rest)));
    }
    if base.contains("://") {
        return base.to_string();
    }
    if let Some(scp) = scp_like(base) {
        return scp;
    }
    if is_shorthand(base) {
        return format!("https://github.com/{}", base);
    }
    base.to_string()
}

/// Drop a `user@` prefix from the authority part.
fn strip_user(rest: &str) -> &str {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    }
}

/// `host:7999/path` keeps its port; `host:owner/repo` becomes `host/owner/repo`.
fn ssh_host_path(rest: &str) -> String {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(colon) = rest[..authority_end].find(':') else {
        return rest.to_string();
    };

    let (host, after) = (&rest[..colon], &rest[colon + 1..]);
    let segment_end = after.find('/').unwrap_or(after.len());
    if is_port(&after[..segment_end]) {
        rest.to_string()
    } else {
        format!("{}/{}", host, after)
    }
}

fn is_port(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// `user@host:owner/repo` → `https://host/owner/repo`.
fn scp_like(base: &str) -> Option<String> {
    let (user, rest) = base.split_once('@')?;
    let (host, path) = rest.split_once(':')?;
    let valid = !user.is_empty()
        && !user.contains(['/', ':'])
        && !host.is_empty()
        && !host.contains('/')
        && !path.is_empty();
    valid.then(|| format!("https://{}/{}", host, path.trim_start_matches('/')))
}

/// Bare `owner/repo`: no scheme, no colon, no leading slash or dot, one inner `/`.
fn is_shorthand(base: &str) -> bool {
    match base.split_once('/') {
        Some((owner, repo)) => {
            let repo = repo.strip_suffix('/').unwrap_or(repo);
            !owner.is_empty()
                && !owner.starts_with('.')
                && !repo.is_empty()
                && !repo.contains('/')
                && !base.contains([':', '@'])
                && !base.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn canon(raw: &str) -> Option<String> {
        canonicalize_url(raw)
    }

    #[test]
    fn test_known_dialects() {
        let cases = [
            ("git+ssh://git@github.com/org/repo.git#main", "https://github.com/org/repo#main"),
            ("git@github.com:org/repo.git", "https://github.com/org/repo"),
            ("ssh://git@github.com:org/repo.git", "https://github.com/org/repo"),
            ("https://github.com/org/repo.git", "https://github.com/org/repo"),
            ("formatjs/formatjs", "https://github.com/formatjs/formatjs"),
            ("github:org/repo", "https://github.com/org/repo"),
            ("git://github.com/org/repo.git", "https://github.com/org/repo"),
            ("git+https://github.com/org/repo.git", "https://github.com/org/repo"),
            ("ssh://git@bitbucket.example.com:7999/proj/repo.git", "https://bitbucket.example.com:7999/proj/repo"),
            ("https://github.com/org/repo/", "https://github.com/org/repo"),
            ("https://github.com/org/repo.GIT", "https://github.com/org/repo"),
            ("https://lodash.com/", "https://lodash.com"),
            ("org/repo/", "https://github.com/org/repo"),
            ("https://github.com/org/repo.git/", "https://github.com/org/repo"),
            ("org/repo.git/", "https://github.com/org/repo"),
            ("git@github.com:org/repo.git/", "https://github.com/org/repo"),
            ("git+https://github.com/org/repo.git/#main", "https://github.com/org/repo#main"),
        ];
        for (input, expected) in cases {
            assert_eq!(canon(input).as_deref(), Some(expected), "input: {}", input);
        }
    }

    #[test]
    fn test_unrecognized_passes_through() {
        assert_eq!(canon("svn://example.com/repo").as_deref(), Some("svn://example.com/repo"));
        assert_eq!(canon("not a url").as_deref(), Some("not a url"));
    }

    #[test]
    fn test_relative_paths_are_not_shorthand() {
        assert_eq!(canon("../repo").as_deref(), Some("../repo"));
        assert_eq!(canon("./repo").as_deref(), Some("./repo"));
        assert_eq!(canon(".hidden/repo").as_deref(), Some(".hidden/repo"));
    }

    #[test]
    fn test_git_suffix_with_trailing_slash_is_idempotent() {
        for raw in ["https://github.com/org/repo.git/", "org/repo.git/", "git@github.com:org/repo.git/"] {
            let once = canon(raw).unwrap();
            assert_eq!(once, "https://github.com/org/repo");
            assert_eq!(canon(&once), Some(once.clone()));
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(canon(""), None);
        assert_eq!(canon("   "), None);
    }

    #[test]
    fn test_structured_field() {
        let field = json!({ "type": "git", "url": "git+https://github.com/lodash/lodash.git" });
        assert_eq!(canonicalize(&field).as_deref(), Some("https://github.com/lodash/lodash"));
        assert_eq!(canonicalize(&json!("org/repo")).as_deref(), Some("https://github.com/org/repo"));
        assert_eq!(canonicalize(&json!({ "type": "git" })), None);
        assert_eq!(canonicalize(&json!(42)), None);
        assert_eq!(canonicalize(&json!(["org/repo"])), None);
    }

    fn arb_repository() -> impl Strategy<Value = String> {
        let seg = "[a-z][a-z0-9-]{0,8}";
        (
            prop_oneof![
                Just("git+ssh://git@{h}/{o}/{r}"),
                Just("git@{h}:{o}/{r}"),
                Just("ssh://git@{h}:{o}/{r}"),
                Just("ssh://git@{h}:7999/{o}/{r}"),
                Just("git://{h}/{o}/{r}"),
                Just("https://{h}/{o}/{r}"),
                Just("github:{o}/{r}"),
                Just("{o}/{r}"),
            ],
            seg,
            seg,
            seg,
            prop_oneof![Just(""), Just(".git"), Just("/"), Just(".git/")],
            prop_oneof![Just(""), Just("#main"), Just("#v1.0.0")],
        )
            .prop_map(|(template, host, owner, repo, suffix, fragment)| {
                let url = template
                    .replace("{h}", &format!("{}.com", host))
                    .replace("{o}", &owner)
                    .replace("{r}", &repo);
                format!("{}{}{}", url, suffix, fragment)
            })
    }

    proptest! {
        #[test]
        fn prop_idempotent(raw in arb_repository()) {
            let once = canonicalize_url(&raw).unwrap();
            prop_assert_eq!(canonicalize_url(&once), Some(once.clone()));
            prop_assert!(once.starts_with("https://"));
        }
    }
}
