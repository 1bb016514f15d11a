pub mod dataset;
pub mod error;
pub mod merge;
pub mod model;
pub mod report;
pub mod table;

pub use dataset::Dataset;
pub use error::DataError;
pub use model::{Freshness, Language, MergeStrategy, PageRecord};
pub use table::Table;

pub fn print_banner() {
    println!(
        r#"
                                       _
     _ __   __ _  __ _  ___ _ __ ___ | |_
    | '_ \ / _` |/ _` |/ _ \ '__/ _ \| __|
    | |_) | (_| | (_| |  __/ | | (_) | |_
    | .__/ \__,_|\__, |\___|_|  \___/ \__|
    |_|          |___/

    content freshness monitoring  v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
