use pref_dns_application::use_cases::FieldBindings;
use pref_dns_domain::DomainError;
use std::sync::Arc;

mod helpers;
use helpers::MockConfigStore;

fn bindings() -> (Arc<MockConfigStore>, FieldBindings) {
    let store = Arc::new(MockConfigStore::with_packages(&["pref_dns", "mosdns", "passwall"]));
    (store.clone(), FieldBindings::new(store))
}

#[tokio::test]
async fn test_show_applies_read_time_defaults() {
    let (_, fields) = bindings();

    let all = fields.show().await.unwrap();

    assert_eq!(all["dns_server"], "119.29.29.29");
    assert_eq!(all["mosdns_enabled"], "1");
    assert_eq!(all["cron_enabled"], "0");
    assert_eq!(all["cron_preset"], "every-6-hours");
    assert_eq!(all["cron_expression"], "0 */6 * * *");
    assert_eq!(all["dns_shunt"], "dnsmasq");
    assert_eq!(all["remote_dns"], "127.0.0.1#5335");
    assert_eq!(all["dns_redirect"], "1");
    assert_eq!(all.len(), fields.names().len());
}

#[tokio::test]
async fn test_remote_dns_default_follows_listen_port_without_persisting() {
    let (store, fields) = bindings();
    store.put("mosdns", "config", "listen_port", "5353");

    assert_eq!(fields.get("remote_dns").await.unwrap(), "127.0.0.1#5353");
    assert_eq!(store.single("passwall", "@global[0]", "remote_dns"), None);
}

#[tokio::test]
async fn test_explicit_remote_dns_is_kept() {
    let (store, fields) = bindings();
    store.put("mosdns", "config", "listen_port", "5353");

    fields.set("remote_dns", "10.0.0.1#53").await.unwrap();

    assert_eq!(fields.get("remote_dns").await.unwrap(), "10.0.0.1#53");
}

#[tokio::test]
async fn test_invalid_value_is_not_written() {
    let (store, fields) = bindings();

    let err = fields.set("dns_mode", "quic").await.unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(store.apply_count(), 0);
}

#[tokio::test]
async fn test_unknown_field_is_invalid_input() {
    let (_, fields) = bindings();

    let err = fields.get("listen_port").await.unwrap_err();

    assert_eq!(err.kind(), "invalid_input");
}

#[tokio::test]
async fn test_domain_list_is_normalized() {
    let (store, fields) = bindings();

    fields
        .set("domain", "Example.com, cdn.example.com example.com")
        .await
        .unwrap();

    assert_eq!(
        store.list("pref_dns", "config", "domain"),
        vec!["example.com", "cdn.example.com"]
    );
    assert_eq!(
        fields.get("domain").await.unwrap(),
        "example.com, cdn.example.com"
    );
}

#[tokio::test]
async fn test_domain_rejects_bad_hostname() {
    let (_, fields) = bindings();

    assert!(fields.set("domain", "good.com, bad_.-com").await.is_err());
    assert!(fields.set("domain", " , ").await.is_err());
}

#[tokio::test]
async fn test_flags_are_normalized() {
    let (store, fields) = bindings();

    fields.set("cron_enabled", "true").await.unwrap();
    fields.set("remote_fakedns", "1").await.unwrap();

    assert_eq!(store.single("pref_dns", "config", "cron_enabled").as_deref(), Some("1"));
    assert_eq!(
        store.single("passwall", "@global[0]", "remote_fakedns").as_deref(),
        Some("1")
    );
    assert!(fields.set("dns_redirect", "maybe").await.is_err());
}

#[tokio::test]
async fn test_cron_preset_writes_expression() {
    let (store, fields) = bindings();

    fields.set("cron_preset", "hourly").await.unwrap();

    assert_eq!(
        store.single("pref_dns", "config", "cron_expression").as_deref(),
        Some("0 * * * *")
    );
    assert_eq!(fields.get("cron_preset").await.unwrap(), "hourly");
}

#[tokio::test]
async fn test_cron_preset_custom_writes_nothing() {
    let (store, fields) = bindings();
    fields.set("cron_expression", "15 3 * * 1").await.unwrap();
    let applies = store.apply_count();

    fields.set("cron_preset", "custom").await.unwrap();

    assert_eq!(store.apply_count(), applies);
    assert_eq!(fields.get("cron_preset").await.unwrap(), "custom");
    assert_eq!(fields.get("cron_expression").await.unwrap(), "15 3 * * 1");
}

#[tokio::test]
async fn test_cron_expression_needs_five_fields() {
    let (_, fields) = bindings();

    let err = fields.set("cron_expression", "* * * *").await.unwrap_err();

    assert!(err.to_string().contains("cron_expression"));
}

#[tokio::test]
async fn test_doh_validation() {
    let (_, fields) = bindings();

    assert!(fields
        .set("remote_dns_doh", "https://1.1.1.1/dns-query,1.1.1.1")
        .await
        .is_ok());
    assert!(fields.set("remote_dns_doh", "").await.is_ok());
    assert!(fields
        .set("remote_dns_doh", "http://dns.example/dns-query")
        .await
        .is_err());
}

#[tokio::test]
async fn test_proxy_fields_need_proxy_package() {
    let store = Arc::new(MockConfigStore::with_packages(&["pref_dns", "mosdns"]));
    let fields = FieldBindings::new(store);

    let err = fields.set("dns_shunt", "smartdns").await.unwrap_err();

    assert_eq!(err.kind(), "config_store_unavailable");
}

#[tokio::test]
async fn test_preference_fields_create_section() {
    let store = Arc::new(MockConfigStore::new());
    let fields = FieldBindings::new(store.clone());

    fields.set("dns_server", "223.5.5.5").await.unwrap();

    assert_eq!(
        store.single("pref_dns", "config", "dns_server").as_deref(),
        Some("223.5.5.5")
    );
}
