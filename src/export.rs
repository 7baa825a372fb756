use crate::processing::Partition;
use crate::types::Observation;
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub fn to_feature_collection(partition: &Partition<'_>) -> FeatureCollection {
    let mut features: Vec<Feature> = partition
        .deaths
        .iter()
        .map(|o| observation_feature(o, "death"))
        .collect();

    if partition.pump_radius > 0 {
        features.extend(partition.pumps.iter().map(|o| observation_feature(o, "pump")));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn observation_feature(obs: &Observation, kind: &str) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("count".to_string(), obs.count.into());
    properties.insert("kind".to_string(), kind.into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![obs.lon(), obs.lat()]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create export directory")?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), collection)
        .context("Failed to write GeoJSON")?;
    info!("Wrote {} features to {:?}", collection.features.len(), path);
    Ok(())
}
