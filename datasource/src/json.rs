//! Reading and writing data-source files.
//!
//! Two layouts are supported. The long layout is an object mapping
//! `datasource_{id}` keys to complete records. The short layout adds a
//! `shared_properties` entry holding the fields common to all sources,
//! which are omitted from the individual records.

use crate::{common::*, source::KEY_PREFIX, DataSource};

/// Key of the shared fields entry in short data-source files.
pub const SHARED_PROPERTIES_KEY: &str = "shared_properties";

/// Load data sources from a long-format file.
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<DataSource>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("unable to read data source file '{}'", path.display()))?;
    let sources: IndexMap<String, DataSource> = serde_json::from_str(&text)
        .with_context(|| format!("invalid data source file '{}'", path.display()))?;
    debug!("loaded {} data sources from '{}'", sources.len(), path.display());
    Ok(sources.into_iter().map(|(_, source)| source).collect())
}

/// Save data sources in the long format.
pub fn save_json(sources: &[DataSource], path: impl AsRef<Path>) -> Result<()> {
    let map = to_keyed_map(sources)?;
    write_pretty(&map, path.as_ref())
}

/// Load data sources from a file in either layout.
///
/// Shared properties are merged into each source and take precedence over
/// per-source values.
pub fn load_short_json(path: impl AsRef<Path>) -> Result<Vec<DataSource>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("unable to read data source file '{}'", path.display()))?;
    let dict: IndexMap<String, Map<String, Value>> = serde_json::from_str(&text)
        .with_context(|| format!("invalid data source file '{}'", path.display()))?;
    let sources = from_short_dict(dict)
        .with_context(|| format!("invalid data source file '{}'", path.display()))?;
    debug!("loaded {} data sources from '{}'", sources.len(), path.display());
    Ok(sources)
}

/// Save data sources with their shared fields factored out.
pub fn save_short_json(sources: &[DataSource], path: impl AsRef<Path>) -> Result<()> {
    let shared = find_shared_properties(sources)?;
    let dict = to_short_form(sources, &shared)?;
    write_pretty(&dict, path.as_ref())
}

/// Fields whose values are identical across all sources.
///
/// Returns an empty map for an empty source list.
pub fn find_shared_properties(sources: &[DataSource]) -> Result<Map<String, Value>> {
    let records: Vec<Map<String, Value>> = sources.iter().map(to_record).try_collect()?;
    let (first, rest) = match records.split_first() {
        Some(split) => split,
        None => return Ok(Map::new()),
    };

    let shared = first
        .iter()
        .filter(|(field, value)| rest.iter().all(|record| record.get(*field) == Some(*value)))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    Ok(shared)
}

/// Build the short layout: `shared` first, then each source without the
/// shared fields.
pub fn to_short_form(
    sources: &[DataSource],
    shared: &Map<String, Value>,
) -> Result<IndexMap<String, Map<String, Value>>> {
    let mut dict = IndexMap::new();
    dict.insert(SHARED_PROPERTIES_KEY.to_string(), shared.clone());

    for source in sources {
        let mut record = to_record(source)?;
        shared.keys().for_each(|field| {
            record.remove(field);
        });
        let prev = dict.insert(source.key(), record);
        ensure!(prev.is_none(), "duplicated data source id '{}'", source.id);
    }

    Ok(dict)
}

/// Inverse of [to_short_form]. Dictionaries without shared properties are
/// accepted as long-format data.
pub fn from_short_dict(mut dict: IndexMap<String, Map<String, Value>>) -> Result<Vec<DataSource>> {
    if let Some(shared) = dict.shift_remove(SHARED_PROPERTIES_KEY) {
        if let Some(key) = dict.keys().find(|key| !key.starts_with(KEY_PREFIX)) {
            bail!("data source key '{}' does not start with '{}'", key, KEY_PREFIX);
        }

        dict.values_mut().for_each(|record| {
            record.extend(shared.iter().map(|(field, value)| (field.clone(), value.clone())));
        });
    }

    dict.into_iter()
        .map(|(key, record)| {
            serde_json::from_value::<DataSource>(Value::Object(record))
                .with_context(|| format!("invalid data source '{}'", key))
        })
        .try_collect()
}

pub(crate) fn to_keyed_map(sources: &[DataSource]) -> Result<IndexMap<String, &DataSource>> {
    let mut map = IndexMap::with_capacity(sources.len());
    for source in sources {
        let prev = map.insert(source.key(), source);
        ensure!(prev.is_none(), "duplicated data source id '{}'", source.id);
    }
    Ok(map)
}

pub(crate) fn to_record(source: &DataSource) -> Result<Map<String, Value>> {
    match serde_json::to_value(source)? {
        Value::Object(record) => Ok(record),
        _ => unreachable!("data sources serialize to objects"),
    }
}

pub(crate) fn write_pretty<T>(value: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');

    fs::write(path, buf)
        .with_context(|| format!("unable to write data source file '{}'", path.display()))?;
    info!("saved data source file '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbox::BBox3;

    fn sources() -> Vec<DataSource> {
        (0..3)
            .map(|idx| DataSource {
                input_path: Some("/wkw/color/1".into()),
                input_bbox: Some(BBox3::from_xyzd([idx * 140, 0, 0, 140, 140, 1])),
                input_mean: Some(r64(148.0)),
                input_std: Some(r64(36.0)),
                ..DataSource::new(idx.to_string())
            })
            .collect()
    }

    #[test]
    fn shared_properties_detection() {
        let shared = find_shared_properties(&sources()).unwrap();
        let fields: Vec<_> = shared.keys().map(String::as_str).collect();
        assert_eq!(
            fields,
            [
                "input_path",
                "input_mean",
                "input_std",
                "target_path",
                "target_bbox",
                "target_class",
                "target_binary"
            ]
        );
        assert!(find_shared_properties(&[]).unwrap().is_empty());
    }

    #[test]
    fn short_form_round_trip() {
        let sources = sources();
        let shared = find_shared_properties(&sources).unwrap();
        let dict = to_short_form(&sources, &shared).unwrap();

        assert_eq!(dict.keys().next().unwrap(), SHARED_PROPERTIES_KEY);
        let record = &dict["datasource_1"];
        assert!(record.contains_key("input_bbox"));
        assert!(!record.contains_key("input_path"));

        let restored = from_short_dict(dict).unwrap();
        assert_eq!(restored, sources);
    }

    #[test]
    fn short_form_rejects_foreign_keys() {
        let sources = sources();
        let shared = find_shared_properties(&sources).unwrap();
        let mut dict = to_short_form(&sources, &shared).unwrap();
        let record = dict.shift_remove("datasource_2").unwrap();
        dict.insert("extra".to_string(), record);
        assert!(from_short_dict(dict).is_err());
    }

    #[test]
    fn duplicated_ids_are_rejected() {
        let mut sources = sources();
        sources[2].id = "0".into();
        assert!(to_keyed_map(&sources).is_err());
    }
}
