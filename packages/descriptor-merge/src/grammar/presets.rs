//! Built-in document families for Java EE deployment descriptors.

use super::family::DocumentFamily;
use super::registry::GrammarRegistry;
use super::tag::TagKey;

/// Family id of `web.xml` descriptors.
pub const WEB_APP: &str = "web-app";

/// Family id of `application.xml` descriptors.
pub const APPLICATION: &str = "application";

/// Create the `web-app` family (servlet 2.3 content model plus the 2.4
/// additions).
#[must_use]
pub fn create_web_app_family() -> DocumentFamily {
    DocumentFamily::new(WEB_APP, "web-app")
        // Single-valued tags, in any parent
        .tag("icon", false)
        .tag("display-name", false)
        .tag("description", false)
        .tag("distributable", false)
        .tag("session-config", false)
        .tag("session-timeout", false)
        .tag("welcome-file-list", false)
        .tag("login-config", false)
        .tag("auth-method", false)
        .tag("realm-name", false)
        .tag("form-login-config", false)
        .tag("jsp-config", false)
        .tag("auth-constraint", false)
        .tag("user-data-constraint", false)
        .tag("transport-guarantee", false)
        .tag("servlet-name", false)
        .tag("servlet-class", false)
        .tag("jsp-file", false)
        .tag("load-on-startup", false)
        .tag("run-as", false)
        .tag("filter-name", false)
        .tag("filter-class", false)
        .tag("listener-class", false)
        .tag("param-name", false)
        .tag("param-value", false)
        .tag("location", false)
        .tag("error-code", false)
        .tag("exception-type", false)
        .tag("extension", false)
        .tag("mime-type", false)
        .tag("web-resource-name", false)
        .tag("ejb-ref-name", false)
        .tag("ejb-ref-type", false)
        .tag("home", false)
        .tag("remote", false)
        .tag("local-home", false)
        .tag("local", false)
        .tag("ejb-link", false)
        .tag("taglib-uri", false)
        .tag("taglib-location", false)
        // Identified repeatable tags
        .keyed_tag("context-param", TagKey::child("param-name"))
        .keyed_tag("init-param", TagKey::child("param-name"))
        .keyed_tag("filter", TagKey::child("filter-name"))
        .keyed_tag("filter-mapping", TagKey::child("filter-name"))
        .keyed_tag("listener", TagKey::child("listener-class"))
        .keyed_tag("servlet", TagKey::child("servlet-name"))
        .keyed_tag("servlet-mapping", TagKey::child("url-pattern"))
        .keyed_tag("mime-mapping", TagKey::child("extension"))
        .keyed_tag(
            "error-page",
            TagKey::children(["error-code", "exception-type"]),
        )
        .keyed_tag("taglib", TagKey::child("taglib-uri"))
        .keyed_tag("resource-env-ref", TagKey::child("resource-env-ref-name"))
        .keyed_tag("resource-ref", TagKey::child("res-ref-name"))
        .keyed_tag("security-role", TagKey::child("role-name"))
        .keyed_tag("env-entry", TagKey::child("env-entry-name"))
        .keyed_tag("ejb-ref", TagKey::child("ejb-ref-name"))
        .keyed_tag("ejb-local-ref", TagKey::child("ejb-ref-name"))
        // Repeatable without identity
        .tag("security-constraint", true)
        .tag("web-resource-collection", true)
        .tag("url-pattern", true)
        .tag("http-method", true)
        .tag("role-name", true)
        .tag("welcome-file", true)
        .tag("dispatcher", true)
        .order(
            "web-app",
            [
                "icon",
                "display-name",
                "description",
                "distributable",
                "context-param",
                "filter",
                "filter-mapping",
                "listener",
                "servlet",
                "servlet-mapping",
                "session-config",
                "mime-mapping",
                "welcome-file-list",
                "error-page",
                "jsp-config",
                "taglib",
                "resource-env-ref",
                "resource-ref",
                "security-constraint",
                "login-config",
                "security-role",
                "env-entry",
                "ejb-ref",
                "ejb-local-ref",
                "service-ref",
                "message-destination-ref",
                "message-destination",
                "locale-encoding-mapping-list",
            ],
        )
        .order(
            "servlet",
            [
                "icon",
                "servlet-name",
                "display-name",
                "description",
                "servlet-class",
                "jsp-file",
                "init-param",
                "load-on-startup",
                "run-as",
                "security-role-ref",
            ],
        )
        .order(
            "filter",
            [
                "icon",
                "filter-name",
                "display-name",
                "description",
                "filter-class",
                "init-param",
            ],
        )
        .order(
            "filter-mapping",
            ["filter-name", "url-pattern", "servlet-name", "dispatcher"],
        )
        .order("servlet-mapping", ["servlet-name", "url-pattern"])
        .order("context-param", ["param-name", "param-value", "description"])
        .order("init-param", ["param-name", "param-value", "description"])
        .order("listener", ["description", "display-name", "icon", "listener-class"])
        .order("session-config", ["session-timeout"])
        .order("mime-mapping", ["extension", "mime-type"])
        .order("welcome-file-list", ["welcome-file"])
        .order("error-page", ["error-code", "exception-type", "location"])
        .order("taglib", ["taglib-uri", "taglib-location"])
        .order(
            "security-constraint",
            [
                "display-name",
                "web-resource-collection",
                "auth-constraint",
                "user-data-constraint",
            ],
        )
        .order(
            "web-resource-collection",
            ["web-resource-name", "description", "url-pattern", "http-method"],
        )
        .order("auth-constraint", ["description", "role-name"])
        .order("user-data-constraint", ["description", "transport-guarantee"])
        .order(
            "login-config",
            ["auth-method", "realm-name", "form-login-config"],
        )
        .order("security-role", ["description", "role-name"])
        .order(
            "ejb-ref",
            [
                "description",
                "ejb-ref-name",
                "ejb-ref-type",
                "home",
                "remote",
                "ejb-link",
            ],
        )
        .order(
            "ejb-local-ref",
            [
                "description",
                "ejb-ref-name",
                "ejb-ref-type",
                "local-home",
                "local",
                "ejb-link",
            ],
        )
}

/// Create the `application` family (`application.xml` of an EAR).
#[must_use]
pub fn create_application_family() -> DocumentFamily {
    DocumentFamily::new(APPLICATION, "application")
        .tag("icon", false)
        .tag("display-name", false)
        .tag("description", false)
        .tag("web", false)
        .tag("web-uri", false)
        .tag("context-root", false)
        .tag("ejb", false)
        .tag("java", false)
        .tag("connector", false)
        .tag("alt-dd", false)
        .tag("role-name", false)
        .tag("library-directory", false)
        .keyed_tag(
            "module",
            TagKey::children(["web/web-uri", "ejb", "java", "connector"]),
        )
        .keyed_tag("security-role", TagKey::child("role-name"))
        .order(
            "application",
            [
                "icon",
                "display-name",
                "description",
                "module",
                "security-role",
                "library-directory",
            ],
        )
        .order("module", ["connector", "ejb", "java", "web", "alt-dd"])
        .order("web", ["web-uri", "context-root"])
        .order("security-role", ["description", "role-name"])
}

/// Create a grammar registry with all built-in families.
#[must_use]
pub fn create_default_grammar() -> GrammarRegistry {
    GrammarRegistry::new()
        .with_family(create_web_app_family())
        .with_family(create_application_family())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grammar_families() {
        let grammar = create_default_grammar();
        let ids: Vec<_> = grammar.families().map(|f| f.id().to_string()).collect();
        assert_eq!(ids, vec![APPLICATION, WEB_APP]);
    }

    #[test]
    fn test_detect_web_app() {
        let grammar = create_default_grammar();
        let family = grammar.detect_family("web-app").unwrap();
        assert_eq!(family.id(), WEB_APP);
    }

    #[test]
    fn test_web_app_keys() {
        let family = create_web_app_family();
        let param = family.resolve_tag("context-param").unwrap();
        assert_eq!(param.key(), Some(&TagKey::child("param-name")));

        let error_page = family.resolve_tag("error-page").unwrap();
        assert_eq!(
            error_page.key().map(ToString::to_string),
            Some("error-code>exception-type".to_string())
        );
    }

    #[test]
    fn test_web_app_single_tags() {
        let family = create_web_app_family();
        for name in ["display-name", "session-config", "login-config", "web-app"] {
            assert!(
                !family.resolve_tag(name).unwrap().is_multiple_allowed(),
                "{name} should be single"
            );
        }
        assert!(family.resolve_tag("servlet").unwrap().is_multiple_allowed());
    }

    #[test]
    fn test_web_app_order() {
        let family = create_web_app_family();
        let filter = family.rank("web-app", "filter").unwrap();
        let servlet = family.rank("web-app", "servlet").unwrap();
        let mapping = family.rank("web-app", "servlet-mapping").unwrap();
        assert!(filter < servlet);
        assert!(servlet < mapping);
        assert!(family.is_container("servlet"));
    }

    #[test]
    fn test_application_module_key() {
        let family = create_application_family();
        let module = family.resolve_tag("module").unwrap();
        assert!(module.key().is_some());
        assert_eq!(family.rank("application", "module"), Some(3));
    }
}
