use url::Url;

use crate::auth::Token;

pub const REPOSITORY_PARAM: &str = "repository";
pub const TOKEN_PARAM: &str = "travis-token";

/// Repository slug and token that drive one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub repository_slug: String,
    pub travis_token: Token,
}

impl Credentials {
    pub fn new(repository_slug: impl Into<String>, travis_token: impl Into<Token>) -> Self {
        Self {
            repository_slug: repository_slug.into(),
            travis_token: travis_token.into(),
        }
    }

    /// Both fields are set; a fetch is never attempted otherwise.
    pub fn is_complete(&self) -> bool {
        !self.repository_slug.is_empty() && !self.travis_token.is_empty()
    }

    /// Overrides fields with the `repository` and `travis-token` query
    /// parameters of a dashboard location, when present.
    pub fn seed_from_location(&mut self, location: &Url) {
        for (key, value) in location.query_pairs() {
            match key.as_ref() {
                REPOSITORY_PARAM => self.repository_slug = value.into_owned(),
                TOKEN_PARAM => self.travis_token = Token::from(value.into_owned()),
                _ => {}
            }
        }
    }
}

/// Rewrites the `repository` query parameter in place.
///
/// Path, fragment and other parameters are preserved in their original order.
pub fn with_repository_param(location: &Url, repository_slug: &str) -> Url {
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in location.query_pairs() {
        if key == REPOSITORY_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), repository_slug.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((REPOSITORY_PARAM.to_string(), repository_slug.to_string()));
    }

    let mut rewritten = location.clone();
    rewritten.query_pairs_mut().clear().extend_pairs(pairs);
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn completeness_requires_both_fields() {
        assert!(Credentials::new("foo/bar", "abc").is_complete());
        assert!(!Credentials::new("", "abc").is_complete());
        assert!(!Credentials::new("foo/bar", "").is_complete());
    }

    mod seed_from_location {
        use super::*;

        #[test]
        fn query_parameters_override_defaults() {
            let mut credentials = Credentials::new("cozy/cozy-contacts", "default-token");
            credentials.seed_from_location(&url(
                "http://localhost:3000/?repository=foo/bar&travis-token=abc",
            ));
            assert_eq!(credentials, Credentials::new("foo/bar", "abc"));
        }

        #[test]
        fn absent_parameters_keep_defaults() {
            let mut credentials = Credentials::new("cozy/cozy-contacts", "default-token");
            credentials.seed_from_location(&url("http://localhost:3000/?other=1"));
            assert_eq!(
                credentials,
                Credentials::new("cozy/cozy-contacts", "default-token")
            );
        }

        #[test]
        fn decodes_percent_encoded_values() {
            let mut credentials = Credentials::default();
            credentials.seed_from_location(&url("http://localhost/?repository=foo%2Fbar"));
            assert_eq!(credentials.repository_slug, "foo/bar");
        }
    }

    mod with_repository_param {
        use super::*;

        #[test]
        fn replaces_existing_value_and_keeps_others() {
            let location = url("http://localhost:3000/dash?theme=dark&repository=old/repo#top");
            let rewritten = with_repository_param(&location, "foo/bar");
            assert_eq!(rewritten.path(), "/dash");
            assert_eq!(rewritten.fragment(), Some("top"));
            let pairs: Vec<(String, String)> = rewritten.query_pairs().into_owned().collect();
            assert_eq!(
                pairs,
                vec![
                    ("theme".to_string(), "dark".to_string()),
                    ("repository".to_string(), "foo/bar".to_string()),
                ]
            );
        }

        #[test]
        fn appends_when_missing() {
            let rewritten = with_repository_param(&url("http://localhost:3000/"), "foo/bar");
            assert_eq!(rewritten.as_str(), "http://localhost:3000/?repository=foo%2Fbar");
        }

        #[test]
        fn never_adds_token() {
            let rewritten = with_repository_param(&url("http://localhost:3000/"), "foo/bar");
            assert!(!rewritten.as_str().contains(TOKEN_PARAM));
        }
    }
}
