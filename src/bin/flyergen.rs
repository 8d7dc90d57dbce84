use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "flyergen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a flyer as a JPEG or PNG.
    Render(RenderArgs),
    /// Print the fallback share URL for a page link.
    ShareUrl(ShareUrlArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Name interpolated into the greeting line (placeholder when empty).
    #[arg(long, default_value = "")]
    name: String,

    /// Portrait photo file (any common raster format).
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Flyer template background; the gradient placeholder is painted when
    /// omitted.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Font for the greeting line, and for the other lines unless
    /// overridden.
    #[arg(long)]
    font: PathBuf,

    /// Font for the second line.
    #[arg(long)]
    font_sub: Option<PathBuf>,

    /// Font for the slogan line.
    #[arg(long)]
    font_slogan: Option<PathBuf>,

    /// Layout variant.
    #[arg(long, value_enum, default_value_t = VariantChoice::Landscape)]
    variant: VariantChoice,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpg)]
    format: FormatChoice,
}

#[derive(Parser, Debug)]
struct ShareUrlArgs {
    /// Page URL embedded in the share caption.
    #[arg(long)]
    page_url: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantChoice {
    Landscape,
    Square,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpg,
    Png,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::ShareUrl(args) => cmd_share_url(args),
    }
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let layout = match args.variant {
        VariantChoice::Landscape => flyergen::LayoutVariant::Landscape,
        VariantChoice::Square => flyergen::LayoutVariant::Square,
    }
    .layout();

    let title_font = read_bytes(&args.font)?;
    let fonts = flyergen::FontSet {
        sub: match &args.font_sub {
            Some(p) => read_bytes(p)?,
            None => title_font.clone(),
        },
        slogan: match &args.font_slogan {
            Some(p) => read_bytes(p)?,
            None => title_font.clone(),
        },
        title: title_font,
    };

    let template = flyergen::TemplateCache::new();
    if let Some(path) = &args.template {
        let bytes = read_bytes(path)?;
        template
            .install(&bytes)
            .with_context(|| format!("decode template '{}'", path.display()))?;
    }

    let input = flyergen::RenderInput {
        name: args.name,
        photo: args.photo.as_deref().map(read_bytes).transpose()?,
    };

    let mut renderer = flyergen::CpuRenderer::new();
    let frame = renderer.render(&layout, &input, &template, &fonts)?;

    let bytes = match args.format {
        FormatChoice::Jpg => flyergen::encode_jpeg(&frame)?,
        FormatChoice::Png => flyergen::encode_png(&frame)?,
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_share_url(args: ShareUrlArgs) -> anyhow::Result<()> {
    let req = flyergen::ShareRequest::new(args.page_url);
    println!("{}", flyergen::whatsapp_share_url(&req.caption));
    Ok(())
}
