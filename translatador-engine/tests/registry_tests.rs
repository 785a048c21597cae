//! Process-wide backend registry

use std::sync::Arc;
use translatador_engine::testing::StubBackend;
use translatador_engine::{install_backend, installed_backend, Backend};

#[test]
fn test_install_replaces_previous_backend() {
    assert!(installed_backend().is_none());

    let first: Arc<dyn Backend> = StubBackend::shared();
    install_backend(first.clone());
    assert!(Arc::ptr_eq(&installed_backend().unwrap(), &first));

    let second: Arc<dyn Backend> = StubBackend::shared();
    install_backend(second.clone());
    let installed = installed_backend().unwrap();
    assert!(Arc::ptr_eq(&installed, &second));
    assert_eq!(installed.name(), "stub");
}
