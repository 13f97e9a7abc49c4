//! End-to-end pass over real encoded images with the native backend.
//!
//! Unit tests in `process` use a scripted mock; these tests run the whole
//! thing — selection, probing, Lanczos resize, encoding — against small
//! synthetic JPEG/PNG fixtures on disk.

use darkroom::config::{BackendPreference, Config};
use darkroom::imaging::{BackendKind, Selection, select_backend};
use darkroom::process::{Diagnostic, run_pass};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Site {
    tmp: TempDir,
}

impl Site {
    fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    fn source(&self) -> PathBuf {
        self.tmp.path().join("source")
    }

    fn dest(&self) -> PathBuf {
        self.tmp.path().join("_site")
    }

    fn image_path(&self, dir: &str, name: &str) -> PathBuf {
        self.source().join("assets/images").join(dir).join(name)
    }

    fn dest_path(&self, dir: &str, name: &str) -> PathBuf {
        self.dest().join("assets/images").join(dir).join(name)
    }

    /// Encode a gradient image at `assets/images/<dir>/<name>`; format
    /// follows the extension.
    fn add_image(&self, dir: &str, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.image_path(dir, name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(&path).unwrap();
        path
    }
}

fn native_selection() -> Selection {
    let selection = select_backend(BackendPreference::Native, &mut |w| {
        panic!("native backend should be available: {w}")
    });
    assert_eq!(selection.kind(), Some(BackendKind::Native));
    selection
}

fn run(site: &Site, config: &Config, selection: &Selection) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let report = run_pass(&site.source(), &site.dest(), config, selection, &mut |d| {
        diags.push(d)
    })
    .unwrap();
    assert_eq!(report.total_errors(), 0, "diagnostics: {diags:?}");
    diags
}

fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

#[test]
fn wide_jpeg_is_resized_below_cap_preserving_aspect() {
    let site = Site::new();
    site.add_image("films", "wide.jpg", 1600, 1000);

    let mut config = Config::default();
    config.max_width = 800;

    run(&site, &config, &native_selection());

    let (w, h) = dimensions(&site.dest_path("films", "wide.jpg"));
    assert_eq!(w, 800);
    // Aspect preserved within rounding: 1000 * 800/1600 = 500
    assert_eq!(h, 500);
}

#[test]
fn narrow_png_is_copied_byte_identical() {
    let site = Site::new();
    let source = site.add_image("films", "small.png", 400, 300);

    run(&site, &Config::default(), &native_selection());

    let dest = site.dest_path("films", "small.png");
    assert_eq!(fs::read(&source).unwrap(), fs::read(&dest).unwrap());
}

#[test]
fn per_dir_override_resizes_only_the_listed_directory() {
    let site = Site::new();
    site.add_image("musics", "cover.jpg", 1000, 700);
    site.add_image("photos", "shot.jpg", 1000, 700);

    let mut config = Config::default(); // global 1200
    config.per_dir.insert("musics".into(), 800);

    run(&site, &config, &native_selection());

    let (musics_w, _) = dimensions(&site.dest_path("musics", "cover.jpg"));
    let (photos_w, _) = dimensions(&site.dest_path("photos", "shot.jpg"));
    assert!(musics_w <= 800);
    assert_eq!(photos_w, 1000); // copied unresized
}

#[test]
fn second_run_does_not_rewrite_fresh_copies() {
    let site = Site::new();
    let source = site.add_image("films", "small.jpg", 200, 150);
    // Source in the past so the first copy is already newer
    let past = std::time::SystemTime::now() - std::time::Duration::from_secs(300);
    fs::File::options()
        .append(true)
        .open(&source)
        .unwrap()
        .set_modified(past)
        .unwrap();

    let config = Config::default();
    let selection = native_selection();

    run(&site, &config, &selection);
    let dest = site.dest_path("films", "small.jpg");
    let first = fs::metadata(&dest).unwrap().modified().unwrap();

    run(&site, &config, &selection);
    let second = fs::metadata(&dest).unwrap().modified().unwrap();

    assert_eq!(first, second);
}

#[test]
fn excluded_directory_publishes_derived_file_only() {
    let site = Site::new();
    let source = site.add_image("films", "still.jpg", 1600, 1200);

    let mut config = Config::default();
    config.exclude_originals.insert("films".into());

    run(&site, &config, &native_selection());

    // Cache created next to the source
    let cache = site.image_path("films", "resize/still.jpg");
    assert!(cache.exists());
    let (cache_w, _) = dimensions(&cache);
    assert_eq!(cache_w, 1200);

    // Published file is the derivative, not the raw source bytes
    let dest = site.dest_path("films", "still.jpg");
    assert_eq!(fs::read(&cache).unwrap(), fs::read(&dest).unwrap());
    assert_ne!(fs::read(&source).unwrap(), fs::read(&dest).unwrap());
}

#[test]
fn excluded_directory_replaces_raw_copy_left_by_the_generator() {
    let site = Site::new();
    let source = site.add_image("films", "still.jpg", 1600, 1200);

    // The static-site generator copies raw assets into the destination
    // before this pass runs; the excluded directory must still end up
    // publishing the derivative, not those raw bytes.
    let dest = site.dest_path("films", "still.jpg");
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    fs::copy(&source, &dest).unwrap();

    let mut config = Config::default();
    config.exclude_originals.insert("films".into());
    let selection = native_selection();

    run(&site, &config, &selection);

    let cache = site.image_path("films", "resize/still.jpg");
    assert_eq!(fs::read(&cache).unwrap(), fs::read(&dest).unwrap());
    assert_ne!(fs::read(&source).unwrap(), fs::read(&dest).unwrap());

    // A second run against the now-fresh cache must not regress either
    run(&site, &config, &selection);
    assert_eq!(fs::read(&cache).unwrap(), fs::read(&dest).unwrap());
}

#[test]
fn excluded_directory_with_no_backend_publishes_nothing() {
    let site = Site::new();
    site.add_image("films", "secret.jpg", 1600, 1200);

    let mut config = Config::default();
    config.exclude_originals.insert("films".into());
    config.backend = BackendPreference::None;

    let selection = select_backend(config.backend, &mut |_| {});
    let mut diags = Vec::new();
    let report = run_pass(&site.source(), &site.dest(), &config, &selection, &mut |d| {
        diags.push(d)
    })
    .unwrap();

    assert_eq!(report.total_errors(), 1);
    assert!(!site.dest_path("films", "secret.jpg").exists());
    assert!(
        diags
            .iter()
            .any(|d| matches!(d, Diagnostic::Error(e) if e.contains("secret.jpg")))
    );
}

#[test]
fn gif_files_are_ignored_entirely() {
    let site = Site::new();
    site.add_image("films", "photo.jpg", 200, 150);
    // A .gif next to it — not even valid GIF content, proving it is never read
    let gif = site.image_path("films", "clip.gif");
    fs::write(&gif, "definitely not a gif").unwrap();

    run(&site, &Config::default(), &native_selection());

    assert!(site.dest_path("films", "photo.jpg").exists());
    assert!(!site.dest_path("films", "clip.gif").exists());
}
