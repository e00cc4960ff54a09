use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

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

const WEEKS: usize = 260;

/// (metro, state, starting inventory)
const METROS: &[(&str, &str, f64)] = &[
    ("New York, NY", "NY", 52_000.0),
    ("Los Angeles, CA", "CA", 21_000.0),
    ("Chicago, IL", "IL", 24_000.0),
    ("Dallas, TX", "TX", 19_000.0),
    ("Houston, TX", "TX", 26_000.0),
    ("Washington, DC", "DC", 13_000.0),
    ("Philadelphia, PA", "PA", 15_000.0),
    ("Miami, FL", "FL", 29_000.0),
    ("Atlanta, GA", "GA", 20_000.0),
    ("Boston, MA", "MA", 8_000.0),
    ("Phoenix, AZ", "AZ", 17_000.0),
    ("San Francisco, CA", "CA", 6_500.0),
    ("Riverside, CA", "CA", 11_000.0),
    ("Detroit, MI", "MI", 12_000.0),
    ("Seattle, WA", "WA", 7_500.0),
    ("Minneapolis, MN", "MN", 9_000.0),
    ("San Diego, CA", "CA", 5_000.0),
    ("Tampa, FL", "FL", 14_000.0),
    ("Denver, CO", "CO", 8_500.0),
    ("Austin, TX", "TX", 9_500.0),
];

fn weekly_dates() -> Vec<String> {
    let first = NaiveDate::from_ymd_opt(2019, 1, 5).unwrap_or_default();
    (0..WEEKS)
        .map(|w| (first + Duration::weeks(w as i64)).format("%Y-%m-%d").to_string())
        .collect()
}

/// Seasonal random walk per metro, one value per week.
fn simulate(rng: &mut SimpleRng) -> Vec<Vec<f64>> {
    METROS
        .iter()
        .map(|&(_, _, start)| {
            let mut level = start;
            (0..WEEKS)
                .map(|w| {
                    let season = (w as f64 / 52.0 * std::f64::consts::TAU).sin() * 0.01;
                    let shock = (rng.next_f64() - 0.5) * 0.03;
                    level = (level * (1.0 + season + shock)).max(100.0);
                    level.round()
                })
                .collect()
        })
        .collect()
}

fn grouped(v: f64) -> String {
    let s = format!("{}", v as u64);
    let mut out = String::new();
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn write_regional(dir: &Path, dates: &[String], series: &[Vec<f64>]) -> Result<()> {
    let path = dir.join("Metro_invt_fs_uc_sfrcondo_sm_week.csv");
    let mut w = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![
        "RegionID".to_string(),
        "SizeRank".into(),
        "RegionName".into(),
        "RegionType".into(),
        "StateName".into(),
    ];
    header.extend(dates.iter().cloned());
    w.write_record(&header)?;

    let mut national = vec![
        "102001".to_string(),
        "0".into(),
        "United States".into(),
        "country".into(),
        String::new(),
    ];
    national.extend((0..dates.len()).map(|i| grouped(series.iter().map(|s| s[i]).sum())));
    w.write_record(&national)?;

    for (rank, ((name, state, _), values)) in METROS.iter().zip(series).enumerate() {
        let mut record = vec![
            (394000 + rank).to_string(),
            (rank + 1).to_string(),
            name.to_string(),
            "msa".into(),
            state.to_string(),
        ];
        // The newest metro only starts reporting after a year.
        record.extend(values.iter().enumerate().map(|(i, v)| {
            if rank == METROS.len() - 1 && i < 52 {
                String::new()
            } else {
                grouped(*v)
            }
        }));
        w.write_record(&record)?;
    }
    w.flush()?;
    println!("Wrote {} regions to {}", METROS.len() + 1, path.display());
    Ok(())
}

fn write_aggregated(dir: &Path, dates: &[String], series: &[Vec<f64>]) -> Result<()> {
    let mut states: Vec<&str> = METROS.iter().map(|(_, st, _)| *st).collect();
    states.sort_unstable();
    states.dedup();

    let path = dir.join("aggregated_states.csv");
    let mut w = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["date".to_string(), "United States".into()];
    header.extend(states.iter().map(|s| s.to_string()));
    w.write_record(&header)?;

    for (i, date) in dates.iter().enumerate() {
        let mut record = vec![date.clone(), grouped(series.iter().map(|s| s[i]).sum())];
        for st in &states {
            let total: f64 = METROS
                .iter()
                .zip(series)
                .filter(|((_, s, _), _)| s == st)
                .map(|(_, values)| values[i])
                .sum();
            // A reporting gap, so the chart has something to leave blank.
            if *st == "CO" && (100..104).contains(&i) {
                record.push(String::new());
            } else {
                record.push(grouped(total));
            }
        }
        w.write_record(&record)?;
    }
    w.flush()?;
    drop(w);

    // Trailing blank line, as exported by spreadsheets.
    let mut file = std::fs::OpenOptions::new().append(true).open(&path)?;
    writeln!(file)?;

    println!(
        "Wrote {} weeks x {} states to {}",
        dates.len(),
        states.len(),
        path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("public"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let dates = weekly_dates();
    let series = simulate(&mut rng);

    write_regional(&dir, &dates, &series)?;
    write_aggregated(&dir, &dates, &series)?;
    Ok(())
}
