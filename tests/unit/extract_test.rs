use crate::fixtures::{page_with_panels, SOURCE_PAGE};
use proptest::prelude::*;
use rstest::rstest;
use shadowsync::{parse_servers, ServerRecord};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_page_yields_only_complete_panel() {
        let servers = parse_servers(SOURCE_PAGE);

        assert_eq!(
            servers,
            vec![ServerRecord::new("1.2.3.4", "8388", "secret", "aes-256-cfb").unwrap()]
        );
    }

    #[test]
    fn test_parsing_is_deterministic() {
        assert_eq!(parse_servers(SOURCE_PAGE), parse_servers(SOURCE_PAGE));
    }

    #[test]
    fn test_page_without_panels() {
        assert!(parse_servers("<html><body><p>maintenance</p></body></html>").is_empty());
        assert!(parse_servers("").is_empty());
    }

    #[rstest]
    #[case::missing_ip(None, Some("1"), Some("p"), Some("m"))]
    #[case::missing_port(Some("h"), None, Some("p"), Some("m"))]
    #[case::missing_password(Some("h"), Some("1"), None, Some("m"))]
    #[case::missing_method(Some("h"), Some("1"), Some("p"), None)]
    #[case::empty_method(Some("h"), Some("1"), Some("p"), Some(""))]
    fn test_incomplete_panel_is_dropped(
        #[case] ip: Option<&str>,
        #[case] port: Option<&str>,
        #[case] pw: Option<&str>,
        #[case] method: Option<&str>,
    ) {
        let html = page_with_panels(&[(ip, port, pw, method)]);
        assert!(parse_servers(&html).is_empty());
    }

    #[test]
    fn test_method_heading_must_start_with_prefix() {
        let html = r#"<div class="portfolio-item"><div class="hover-text">
            <span id="ip">h</span><span id="port">1</span><span id="pw">p</span>
            <h4>Encryption Method:aes-128-gcm</h4>
        </div></div>"#;
        assert!(parse_servers(html).is_empty());
    }

    #[test]
    fn test_last_method_heading_wins() {
        let html = r#"<div class="portfolio-item"><div class="hover-text">
            <span id="ip">h</span><span id="port">1</span><span id="pw">p</span>
            <h4>Method:rc4-md5</h4><h4>Method:chacha20-ietf</h4>
        </div></div>"#;
        assert_eq!(parse_servers(html)[0].method(), "chacha20-ietf");
    }

    #[test]
    fn test_method_keeps_space_after_prefix() {
        let html = page_with_panels(&[(Some("h"), Some("1"), Some("p"), Some(" aes-256-gcm"))]);
        assert_eq!(parse_servers(&html)[0].method(), " aes-256-gcm");
    }

    proptest! {
        #[test]
        fn prop_every_record_is_complete(
            panels in prop::collection::vec(
                (
                    prop::option::of("[a-z0-9.]{0,6}"),
                    prop::option::of("[0-9]{0,5}"),
                    prop::option::of("[a-zA-Z0-9]{0,6}"),
                    prop::option::of("[a-z0-9-]{0,8}"),
                ),
                0..6,
            )
        ) {
            let borrowed: Vec<_> = panels
                .iter()
                .map(|(ip, port, pw, method)| {
                    (ip.as_deref(), port.as_deref(), pw.as_deref(), method.as_deref())
                })
                .collect();
            let expected = borrowed
                .iter()
                .filter(|(ip, port, pw, method)| {
                    [ip, port, pw, method].iter().all(|f| f.is_some_and(|v| !v.is_empty()))
                })
                .count();

            let servers = parse_servers(&page_with_panels(&borrowed));

            prop_assert_eq!(servers.len(), expected);
            for server in &servers {
                prop_assert!(!server.host().is_empty());
                prop_assert!(!server.port().is_empty());
                prop_assert!(!server.password().is_empty());
                prop_assert!(!server.method().is_empty());
            }
        }
    }
}
