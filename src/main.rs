//! Thin pipeline driver: raw frame → spots → direction vectors → catalog ids.
//!
//! All logic lives in the library; this binary only wires the stages
//! together. Exit code 0 on success, 1 on any error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use starident::{CentroidMethod, IdentificationMethod, StarCamera, StarIdentifier};

#[derive(Parser)]
#[command(name = "starident")]
#[command(about = "Identify catalog stars in a raw star tracker frame")]
#[command(version)]
struct Cli {
    /// Raw image file: row-major 16-bit little-endian samples.
    image: PathBuf,

    /// Calibration file (cx cy s k1 k2 p1 p2 k3 fx fy).
    #[arg(long)]
    calibration: PathBuf,

    /// Feature table file (one `id1 id2 theta` record per line).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// K-vector file (`Q M` header, then `k id1 id2 theta` records).
    #[arg(long)]
    kvector: Option<PathBuf>,

    /// Image rows.
    #[arg(long, default_value_t = 1944)]
    rows: usize,

    /// Image columns.
    #[arg(long, default_value_t = 2592)]
    cols: usize,

    /// Intensity threshold; pixels below it are zeroed.
    #[arg(long, default_value_t = 64)]
    threshold: u8,

    /// Minimum spot area in pixels.
    #[arg(long, default_value_t = 16)]
    min_area: u32,

    /// Centroiding policy.
    #[arg(long, value_enum, default_value = "cc-weighted")]
    centroiding: Centroiding,

    /// Identification method.
    #[arg(long, value_enum, default_value = "pyramid")]
    method: Method,

    /// Angular tolerance in degrees for catalog matching.
    #[arg(long, default_value_t = 0.15)]
    eps: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Centroiding {
    ContourGeom,
    ContourWeighted,
    ContourBbox,
    CcGeom,
    CcWeighted,
}

impl From<Centroiding> for CentroidMethod {
    fn from(c: Centroiding) -> Self {
        match c {
            Centroiding::ContourGeom => CentroidMethod::ContourGeometric,
            Centroiding::ContourWeighted => CentroidMethod::ContourWeighted,
            Centroiding::ContourBbox => CentroidMethod::ContourBboxWeighted,
            Centroiding::CcGeom => CentroidMethod::ConnectedGeometric,
            Centroiding::CcWeighted => CentroidMethod::ConnectedWeighted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    TwoStar,
    Pyramid,
    PyramidKvector,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::TwoStar => "two-star",
            Method::Pyramid => "pyramid",
            Method::PyramidKvector => "pyramid-kvector",
        }
    }
}

impl From<Method> for IdentificationMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::TwoStar => IdentificationMethod::TwoStar,
            Method::Pyramid => IdentificationMethod::PyramidIndexed,
            Method::PyramidKvector => IdentificationMethod::PyramidKVector,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut camera = StarCamera::new();
    camera.set_threshold(cli.threshold);
    camera.set_min_area(cli.min_area);
    camera
        .load_calibration(&cli.calibration)
        .context("loading calibration")?;
    camera
        .load_image(&cli.image, cli.rows, cli.cols)
        .context("loading raw image")?;

    let n_spots = camera.extract(cli.centroiding.into())?;
    if n_spots == 0 {
        println!("no spots detected");
        return Ok(());
    }
    camera.project_spots()?;

    let mut identifier = StarIdentifier::new();
    match cli.method {
        Method::TwoStar | Method::Pyramid => {
            let Some(catalog) = &cli.catalog else {
                bail!("--catalog is required for {} identification", cli.method.as_str());
            };
            identifier
                .load_feature_table(catalog)
                .context("loading feature table")?;
        }
        Method::PyramidKvector => {
            let Some(kvector) = &cli.kvector else {
                bail!("--kvector is required for pyramid-kvector identification");
            };
            identifier.load_kvector(kvector).context("loading k-vector")?;
        }
    }

    let ids = identifier.identify(camera.spot_vectors(), cli.eps, cli.method.into())?;

    for (spot, id) in camera.spots().iter().zip(ids.iter()) {
        println!(
            "{:10.3} {:10.3} {:6} {}",
            spot.center.x,
            spot.center.y,
            spot.area,
            if *id >= 0 {
                id.to_string()
            } else {
                "unknown".to_string()
            }
        );
    }

    Ok(())
}
