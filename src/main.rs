use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qr_overlay::assets::{AssetSource, FileAssets};
use qr_overlay::manager::trim_input;
use qr_overlay::view::{HeadlessView, View};
use qr_overlay::{Profile, UiController};

#[derive(Parser)]
#[command(name = "qr-overlay")]
#[command(version)]
#[command(about = "Render a styled QR code with a decorative overlay to SVG", long_about = None)]
struct Cli {
    /// Text to encode; falls back to the profile's defaultData
    text: Option<String>,

    /// JSON profile with render and palette settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory image references are resolved against
    #[arg(long)]
    #[cfg_attr(feature = "http", arg(conflicts_with = "base_url"))]
    assets: Option<PathBuf>,

    /// Base URL image references are downloaded from
    #[cfg(feature = "http")]
    #[arg(long)]
    base_url: Option<String>,

    /// Directory qr-code.svg is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write a PNG preview to this path
    #[arg(long)]
    png: Option<PathBuf>,

    /// Long side of the PNG preview in pixels
    #[arg(long, default_value_t = 800)]
    png_size: u32,

    /// Print the default profile as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Print the profile JSON schema and exit
    #[cfg(feature = "jsonschema")]
    #[arg(long)]
    schema: bool,
}

enum CliAssets {
    Files(FileAssets),
    #[cfg(feature = "http")]
    Http(qr_overlay::assets::HttpAssets),
}

impl AssetSource for CliAssets {
    async fn fetch(&self, reference: &str) -> qr_overlay::Result<Vec<u8>> {
        match self {
            Self::Files(files) => files.fetch(reference).await,
            #[cfg(feature = "http")]
            Self::Http(http) => http.fetch(reference).await,
        }
    }
}

impl Cli {
    fn asset_source(&self) -> Result<CliAssets> {
        #[cfg(feature = "http")]
        if let Some(base) = &self.base_url {
            let http = qr_overlay::assets::HttpAssets::new(base)?;
            return Ok(CliAssets::Http(http));
        }
        let root = match (&self.assets, &self.config) {
            (Some(dir), _) => dir.clone(),
            (None, Some(config)) => config.parent().map(PathBuf::from).unwrap_or_default(),
            (None, None) => PathBuf::from("."),
        };
        Ok(CliAssets::Files(FileAssets::new(root)))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", Profile::default().to_json_pretty()?);
        return Ok(());
    }

    #[cfg(feature = "jsonschema")]
    if cli.schema {
        let schema = qr_overlay::profile::profile_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let profile = match &cli.config {
        Some(path) => Profile::from_file(path)
            .with_context(|| format!("failed to load profile {}", path.display()))?,
        None => Profile::default(),
    };

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;
    let view = HeadlessView::new().with_output_dir(&cli.out_dir);
    let assets = cli.asset_source()?;

    let mut ui = UiController::new(profile.render, &profile.palette, view, assets)
        .context("failed to set up the page")?;
    ui.init();
    if let Some(text) = &cli.text {
        ui.view_mut().set_input_value(text);
        ui.on_input();
    }
    if !ui.is_generate_enabled() {
        bail!("nothing to encode: pass TEXT or set render.defaultData in the profile");
    }

    ui.on_generate().await.context("failed to generate the QR code")?;
    ui.on_download().context("failed to save the SVG")?;

    if let Some(path) = &cli.png {
        let png = ui
            .manager()
            .render_png(cli.png_size)?
            .context("no surface to rasterize")?;
        std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote PNG preview");
    }

    let input = ui.view().input_value();
    println!(
        "{} <- {:?}",
        cli.out_dir.join(qr_overlay::view::DOWNLOAD_FILE_NAME).display(),
        trim_input(&input)
    );
    Ok(())
}
