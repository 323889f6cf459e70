/// Dataset preparation CLI
///
/// Turns a plain folder of images into the folder-of-images-plus-CSV
/// format the viewer consumes: per-image intensity and geometry features,
/// min-max normalized into the margin-inset unit range, plus letterboxed
/// base64 thumbnails, written as `features.csv` next to the images.
use std::path::PathBuf;

use clap::Parser;

use featurescope::featurize::{self, FeaturizeOptions};

#[derive(Parser, Debug)]
#[command(name = "featurize", about = "Prepare a features.csv for Featurescope")]
struct Args {
    /// Folder of images to featurize
    images_dir: PathBuf,

    /// Fraction of the unit range kept free around the plotted values
    #[arg(long, default_value_t = featurize::DEFAULT_MARGIN)]
    margin: f64,

    /// Square thumbnail edge in pixels
    #[arg(long, default_value_t = featurize::DEFAULT_THUMBNAIL_SIZE)]
    thumbnail_size: u32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let options = FeaturizeOptions {
        margin: args.margin,
        thumbnail_size: args.thumbnail_size,
    };

    match featurize::featurize_folder(&args.images_dir, &options) {
        Ok(csv_path) => {
            println!("✅ Saved: {}", csv_path.display());
        }
        Err(error) => {
            eprintln!("⚠️  {}", error);
            std::process::exit(1);
        }
    }
}
