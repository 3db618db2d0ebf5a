use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use msi_grid::{load_file, LoaderConfig};

/// 2-D Gaussian blob centred on `(cx, cy)`.
fn blob(x: f64, y: f64, (cx, cy, sigma, amplitude): (f64, f64, f64, f64)) -> f64 {
    let d2 = (x - cx).powi(2) + (y - cy).powi(2);
    amplitude * (-d2 / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

const WIDTH: i64 = 40;
const HEIGHT: i64 = 30;

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_msi.txt"));

    let mut rng = SimpleRng::new(42);

    // Each channel is a few blobs on a flat background: (cx, cy, sigma, amplitude).
    let channels: Vec<(&str, Vec<(f64, f64, f64, f64)>)> = vec![
        ("123.456", vec![(10.0, 8.0, 4.0, 900.0), (30.0, 20.0, 3.0, 400.0)]),
        ("255.233", vec![(20.0, 15.0, 8.0, 600.0)]),
        ("301.118", vec![(5.0, 25.0, 5.0, 300.0), (35.0, 5.0, 2.0, 800.0)]),
        ("478.329", vec![]),
    ];

    let file = File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut out = BufWriter::new(file);

    // Three metadata lines, then the channel list on line 3.
    writeln!(out, "Synthetic MSI export")?;
    writeln!(out, "Pixels\t{}", WIDTH * HEIGHT)?;
    writeln!(out, "Size\t{WIDTH}\t{HEIGHT}")?;
    let names: Vec<&str> = channels.iter().map(|(name, _)| *name).collect();
    writeln!(out, "{}", names.join("\t"))?;

    let mut index = 0;
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            write!(out, "{index}\t{x}\t{y}")?;
            for (_, blobs) in &channels {
                let signal: f64 = blobs
                    .iter()
                    .map(|&b| blob(x as f64, y as f64, b))
                    .sum();
                let background = 5.0 * rng.next_f64();
                write!(out, "\t{:.3}", signal + background)?;
            }
            writeln!(out)?;
            index += 1;
        }
    }
    out.flush().context("flushing output")?;
    drop(out);

    // The output must load as layout A.
    let table = load_file(&output_path, LoaderConfig::header_metadata())
        .context("re-reading generated file")?;
    log::debug!("Reloaded {} pixels", table.len());

    println!(
        "Wrote {index} pixels x {} channels to {}",
        channels.len(),
        output_path.display()
    );
    Ok(())
}
