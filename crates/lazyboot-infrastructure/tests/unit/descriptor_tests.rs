//! Module Descriptor Tests

use lazyboot_domain::{Error, ModuleId, Scope, Token};
use lazyboot_infrastructure::di::{ModuleDescriptor, Provider, module_factory};

struct Config;
struct Db;

const CONFIG: Token<Config> = Token::new("config");
const DB: Token<Db> = Token::new("db");
const DB_AS_CONFIG: Token<Config> = Token::new("db");

fn db_provider() -> lazyboot_infrastructure::di::ProviderRegistration {
    Provider::singleton(DB)
        .depends_on(CONFIG)
        .build(|_| async { Ok(Db) })
}

#[test]
fn test_builder_keeps_registration_order_and_exports() {
    let descriptor = ModuleDescriptor::builder("root")
        .provider(Provider::value(CONFIG, Config))
        .provider(db_provider())
        .export(DB)
        .build()
        .unwrap();

    assert_eq!(descriptor.id(), &ModuleId::from_static("root"));
    let tokens: Vec<_> = descriptor
        .providers()
        .iter()
        .map(|p| p.token().name().to_string())
        .collect();
    assert_eq!(tokens, ["config", "db"]);
    assert_eq!(descriptor.exports(), &[DB.erase()]);
    assert_eq!(descriptor.providers()[1].dependencies(), &[CONFIG.erase()]);
}

#[test]
fn test_builder_rejects_duplicate_tokens() {
    let result = ModuleDescriptor::builder("root")
        .provider(Provider::value(CONFIG, Config))
        .provider(Provider::value(CONFIG, Config))
        .build();

    match result {
        Err(Error::DuplicateProvider { token, module }) => {
            assert_eq!(token, CONFIG.erase());
            assert_eq!(module.as_str(), "root");
        }
        other => panic!("Expected DuplicateProvider, got {other:?}"),
    }
}

#[test]
fn test_builder_rejects_unregistered_export() {
    let result = ModuleDescriptor::builder("root")
        .provider(Provider::value(CONFIG, Config))
        .export(DB)
        .build();
    assert!(matches!(result, Err(Error::InvalidExport { .. })));
}

#[test]
fn test_builder_rejects_export_with_wrong_type() {
    let result = ModuleDescriptor::builder("root")
        .provider(db_provider())
        .export(DB_AS_CONFIG)
        .build();
    assert!(matches!(result, Err(Error::InvalidExport { .. })));
}

#[test]
fn test_export_all_exports_every_registration() {
    let descriptor = ModuleDescriptor::builder("root")
        .provider(Provider::value(CONFIG, Config))
        .provider(db_provider())
        .export_all()
        .export(DB)
        .build()
        .unwrap();
    assert_eq!(descriptor.exports(), &[CONFIG.erase(), DB.erase()]);
}

#[test]
fn test_provider_scopes_and_teardown() {
    let transient = Provider::transient(DB).build(|_| async { Ok(Db) });
    assert_eq!(transient.scope(), Scope::Transient);
    assert!(!transient.has_teardown());

    let singleton = Provider::singleton(DB)
        .on_dispose(|_db| async { Ok(()) })
        .build(|_| async { Ok(Db) });
    assert_eq!(singleton.scope(), Scope::Singleton);
    assert!(singleton.has_teardown());

    assert_eq!(Provider::value(CONFIG, Config).scope(), Scope::Singleton);
}

#[test]
fn test_imports_are_deduplicated_by_module_id() {
    let data = || {
        module_factory("data", || async {
            ModuleDescriptor::builder("data").build()
        })
    };
    let descriptor = ModuleDescriptor::builder("report")
        .import(data())
        .import(data())
        .build()
        .unwrap();

    assert_eq!(
        descriptor.imported_module_ids(),
        vec![ModuleId::from_static("data")]
    );
}
