use es_core::{Emitter, Feed};

/// File name the quicksolver gives its "Save Data" download.
pub fn result_file_name(emitter: Emitter, feed: Feed) -> String {
    format!("{} and {}.csv", emitter, feed)
}
