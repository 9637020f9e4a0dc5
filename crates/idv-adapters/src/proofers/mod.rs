//! Proofers de adaptación. Hoy sólo los mocks deterministas; los vendors
//! reales se enchufan implementando `idv_core::Proofer`.

pub mod mock;
