use media_catalog_models::ItemRecord;

/// Case-insensitive match used by providers that search locally.
///
/// Text fields match by substring; channel numbers match by prefix so that
/// typing "10" finds channel 101.
pub fn matches_query(record: &ItemRecord, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }

    if let Some(channel) = &record.channel_number {
        if channel.starts_with(query) {
            return true;
        }
    }

    let needle = query.to_lowercase();
    [&record.name, &record.subtitle, &record.synopsis]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
