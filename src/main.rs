use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::warn;
use starposter::theme::{DEFAULT_THEME_INDEX, THEMES};
use starposter::{PosterConfig, PosterStudio, RenderRequest, RenderStatus};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "starposter", version, about = "Render deterministic star posters to PNG")]
struct Cli {
    /// JSON config file (density, font timeout, font sources)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the reported display density
    #[arg(long, global = true)]
    density: Option<f32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one poster and write it as PNG
    Render {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        subtitle: String,
        #[arg(long, default_value_t = DEFAULT_THEME_INDEX)]
        theme: usize,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Also print the PNG as a data URL
        #[arg(long)]
        data_url: bool,
    },
    /// Render a JSON list of requests into numbered sub-directories
    Batch {
        requests: PathBuf,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// List the theme catalog
    Themes,
    /// Print the theme index that follows INDEX
    NextTheme { index: usize },
}

fn load_config(cli: &Cli) -> anyhow::Result<PosterConfig> {
    let mut config = match &cli.config {
        Some(path) => PosterConfig::from_json_file(path)?,
        None => PosterConfig::default(),
    };
    if let Some(density) = cli.density {
        config.device_pixel_ratio = density;
    }
    Ok(config)
}

async fn render_one(
    studio: &PosterStudio,
    request: &RenderRequest,
    out: &Path,
    data_url: bool,
) -> anyhow::Result<()> {
    match studio.render(request).await? {
        RenderStatus::Rendered { text_fallback, .. } => {
            if text_fallback {
                warn!("fonts were not ready; text drawn with the bundled face");
            }
        }
        RenderStatus::Superseded { generation } => bail!("render #{} was superseded", generation),
    }
    let png = studio.export_png()?;
    let path = png
        .write_into(out)
        .with_context(|| format!("writing poster into {}", out.display()))?;
    println!("{} {}x{} sha256:{}", path.display(), png.width, png.height, png.sha256_hex());
    if data_url {
        println!("{}", png.to_data_url());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Themes => {
            for (i, t) in THEMES.iter().enumerate() {
                println!(
                    "{} {:<9} background {} -> {}  stars {}  gold {} -> {}",
                    i, t.name, t.background_a, t.background_b, t.star_color, t.gold_a, t.gold_b
                );
            }
        }
        Command::NextTheme { index } => println!("{}", starposter::next_theme(*index)),
        Command::Render {
            title,
            subtitle,
            theme,
            out,
            data_url,
        } => {
            let studio = PosterStudio::new(load_config(&cli)?);
            let request = RenderRequest::new(title.as_str(), subtitle.as_str(), *theme);
            render_one(&studio, &request, out, *data_url).await?;
        }
        Command::Batch { requests, out } => {
            let raw = std::fs::read_to_string(requests)
                .with_context(|| format!("reading {}", requests.display()))?;
            let requests: Vec<RenderRequest> =
                serde_json::from_str(&raw).context("parsing render requests")?;
            let studio = PosterStudio::new(load_config(&cli)?);
            for (i, request) in requests.iter().enumerate() {
                render_one(&studio, request, &out.join(format!("{:03}", i)), false).await?;
            }
        }
    }
    Ok(())
}
