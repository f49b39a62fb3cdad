//! Common test utilities and helpers

pub mod database;
pub mod fixtures;

/// Test data utilities
pub mod test_data {
    use illumine::extractor::FinancialTable;

    /// Register a company with predictable contact details
    pub fn register_test_company(db: &illumine::database::DatabaseManager, name: &str) -> i64 {
        let slug = name.to_lowercase().replace(' ', "");
        db.register_company(name, "12.345.678/0001-90", &format!("contato@{}.com.br", slug))
            .expect("Failed to register test company")
    }

    /// Every required line item for 2019 and 2020
    pub fn create_complete_table() -> FinancialTable {
        FinancialTable::new()
            .with_row("ATIVO CIRCULANTE", [("2019", 100.0), ("2020", 120.0)])
            .with_row("PASSIVO CIRCULANTE", [("2019", 50.0), ("2020", 0.0)])
            .with_row("LUCRO LÍQUIDO", [("2019", 30.0), ("2020", 45.0)])
            .with_row("PATRIMÔNIO LÍQUIDO", [("2019", 300.0), ("2020", 150.0)])
            .with_row("EBITDA", [("2019", 80.0), ("2020", 90.0)])
            .with_row("RECEITA LÍQUIDA", [("2019", 400.0), ("2020", 360.0)])
    }
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Another harness may already have installed a subscriber
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("illumine=debug,test=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
