use anyhow::{Context, Result, bail};
use atoll::clustering::{ClusterOptions, cluster_set};
use atoll::regions::{GeometrySet, Region};
use clap::Parser;
use geo_types::{Geometry, MultiPolygon};
use geojson::GeoJson;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GeoJSON FeatureCollection containing the regions to be surveyed,
    /// already projected to a planar CRS.
    geojson: PathBuf,

    /// Feature property holding the unique region identifier.
    #[arg(long, default_value = "id")]
    id_property: String,

    /// Feature property holding the human-readable region label.
    #[arg(long, default_value = "name")]
    label_property: String,

    /// Override the derived cluster size bound and force clustering on,
    /// even for small sets.
    #[arg(long)]
    max_cluster_size: Option<usize>,

    /// Skip clustering; every region is assigned to cluster 0.
    #[arg(long)]
    disable_clustering: bool,

    /// Output CSV path (region_id,label,cluster_id).
    #[arg(long, default_value = "clusters.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let regions = load_regions(&args)?;
    info!(
        regions = regions.len(),
        path = %args.geojson.display(),
        "loaded regions"
    );

    let set = GeometrySet::new(regions)?;

    if args.disable_clustering && set.len() > 50 {
        warn!(
            regions = set.len(),
            "clustering disabled for a large set; pre-filtering is recommended"
        );
    }

    let options = ClusterOptions {
        max_cluster_size: args.max_cluster_size,
        disable: args.disable_clustering,
    };
    let assignment = cluster_set(&set, &options)?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(["region_id", "label", "cluster_id"])?;
    for region in set.regions() {
        let cluster_id = assignment
            .get(region.id())
            .context("region missing from assignment")?;
        writer.write_record([region.id(), region.label(), &cluster_id.to_string()])?;
    }
    writer.flush()?;

    info!(
        clusters = assignment.cluster_count(),
        output = %args.output.display(),
        "wrote cluster assignment"
    );
    Ok(())
}

fn load_regions(args: &Args) -> Result<Vec<Region>> {
    let contents = fs::read_to_string(&args.geojson)
        .with_context(|| format!("reading {}", args.geojson.display()))?;
    let geojson: GeoJson = contents.parse().context("parsing GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        _ => bail!("expected a GeoJSON FeatureCollection"),
    };

    let mut regions = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        let id = property_string(feature, &args.id_property).with_context(|| {
            format!("feature {index} is missing the {:?} property", args.id_property)
        })?;
        let label = property_string(feature, &args.label_property).with_context(|| {
            format!(
                "feature {index} ({id}) is missing the {:?} property",
                args.label_property
            )
        })?;

        let geometry = feature
            .geometry
            .as_ref()
            .with_context(|| format!("feature {index} ({id}) has no geometry"))?;
        let geometry: Geometry<f64> = geometry
            .try_into()
            .with_context(|| format!("feature {index} ({id}) has an unreadable geometry"))?;
        let geometry = match geometry {
            Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
            Geometry::MultiPolygon(multi) => multi,
            other => bail!(
                "feature {index} ({id}) must be a Polygon or MultiPolygon, got {}",
                geometry_kind(&other)
            ),
        };

        regions.push(Region::new(id, label, geometry)?);
    }
    Ok(regions)
}

fn property_string(feature: &geojson::Feature, key: &str) -> Option<String> {
    feature.property(key).map(|value| match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => "Polygon",
    }
}
