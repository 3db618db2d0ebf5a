use std::fs;
use std::path::Path;

use msi_grid::{
    compute_tic, drop_channels, normalize, to_grid, write_cleaned_file, ChannelProcessor, Coord,
    Grid, LoaderConfig, MsiError, TableLoader, TIC_CHANNEL,
};

const EXPORT: &str = "\
Instrument\tdemo-tof
Acquired\t2023-05-17
Raster\t2x1
123.456\t255.233
0\t0\t0\t100.0\t50.0
1\t1\t0\t0.0\t0.0
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test_log::test]
fn test_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let tmpdir = tempfile::tempdir()?;
    let path = write(tmpdir.path(), "export.txt", EXPORT);

    let mut table = TableLoader::new(LoaderConfig::header_metadata()).load(&path)?;
    compute_tic(&mut table);
    normalize(&mut table, "123.456")?;

    assert_eq!(table.value(Coord::new(0, 0), TIC_CHANNEL), Some(150.0));
    assert_eq!(table.value(Coord::new(1, 0), TIC_CHANNEL), Some(0.0));
    assert!(close(
        table.value(Coord::new(0, 0), "123.456").unwrap(),
        100.0 / 150.0
    ));
    assert_eq!(table.value(Coord::new(1, 0), "123.456"), Some(0.0));

    let grid = to_grid(&table, "123.456")?;
    assert_eq!(grid.shape(), (1, 2));
    assert_eq!(grid.x_axis(), &[0, 1]);
    assert_eq!(grid.y_axis(), &[0]);
    let dense = grid.to_dense(f64::NAN);
    assert!((dense[0][0] - 0.6667).abs() < 1e-4);
    assert_eq!(dense[0][1], 0.0);
    Ok(())
}

#[test_log::test]
fn test_processor_matches_manual_steps() -> Result<(), Box<dyn std::error::Error>> {
    let loader = TableLoader::new(LoaderConfig::header_metadata());
    let mut manual = loader.load_str(EXPORT)?;
    normalize(&mut manual, "255.233")?;
    let expected = to_grid(&manual, "255.233")?;

    let mut table = loader.load_str(EXPORT)?;
    let grid = ChannelProcessor::new("255.233").process(&mut table)?;
    assert_eq!(grid, expected);
    assert_eq!(table, manual);
    Ok(())
}

#[test_log::test]
fn test_cleaned_copy_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let tmpdir = tempfile::tempdir()?;
    let path = write(tmpdir.path(), "export.txt", EXPORT);

    let mut table = TableLoader::new(LoaderConfig::header_metadata()).load(&path)?;
    compute_tic(&mut table);

    let cleaned = tmpdir.path().join("export_cleaned.csv");
    write_cleaned_file(&table, &cleaned, b',')?;
    let reloaded = TableLoader::new(LoaderConfig::cleaned()).load(&cleaned)?;
    assert_eq!(reloaded, table);

    // The cleaned copy keeps TIC as a channel, so normalising the
    // reloaded table gives the same answer as the original.
    normalize(&mut table, "123.456")?;
    let mut reloaded = reloaded;
    normalize(&mut reloaded, "123.456")?;
    assert_eq!(reloaded, table);
    Ok(())
}

#[test_log::test]
fn test_reloaded_copy_drop_then_normalize() -> Result<(), Box<dyn std::error::Error>> {
    let tmpdir = tempfile::tempdir()?;
    let mut table = TableLoader::new(LoaderConfig::header_metadata()).load_str(EXPORT)?;
    compute_tic(&mut table);
    let cleaned = tmpdir.path().join("cleaned.csv");
    write_cleaned_file(&table, &cleaned, b',')?;

    let mut reloaded = TableLoader::new(LoaderConfig::cleaned()).load(&cleaned)?;
    drop_channels(&mut reloaded, &["255.233"])?;
    assert_eq!(reloaded.value(Coord::new(0, 0), TIC_CHANNEL), Some(100.0));

    normalize(&mut reloaded, "123.456")?;
    assert_eq!(reloaded.value(Coord::new(0, 0), "123.456"), Some(1.0));
    assert_eq!(reloaded.value(Coord::new(1, 0), "123.456"), Some(0.0));
    Ok(())
}

#[test]
fn test_drop_trailing_columns_then_normalize() -> Result<(), Box<dyn std::error::Error>> {
    let text = "a\nb\nc\n1.0\t2.0\tjunk1\tjunk2\n0\t0\t0\t1\t3\t1000\t1000\n";
    let mut table = TableLoader::new(LoaderConfig::header_metadata()).load_str(text)?;
    drop_channels(&mut table, &["junk1", "junk2"])?;
    normalize(&mut table, "1.0")?;
    assert_eq!(table.value(Coord::new(0, 0), "1.0"), Some(0.25));
    Ok(())
}

#[test]
fn test_irregular_raster() -> Result<(), Box<dyn std::error::Error>> {
    let text = "X,Y,m\n1,10,1\n3,20,2\n";
    let table = TableLoader::new(LoaderConfig::cleaned()).load_str(text)?;
    let grid = to_grid(&table, "m")?;
    assert_eq!(grid.shape(), (2, 2));
    assert_eq!(grid.at(1, 10), Some(1.0));
    assert_eq!(grid.at(3, 20), Some(2.0));
    assert_eq!(grid.at(3, 10), Grid::MISSING);
    assert_eq!(grid.at(1, 20), Grid::MISSING);
    // (2, 10) was never observed, so it is not even a column
    assert_eq!(grid.at(2, 10), Grid::MISSING);
    Ok(())
}

#[test]
fn test_missing_source_is_recoverable() {
    let tmpdir = tempfile::tempdir().unwrap();
    let missing = tmpdir.path().join("nope.txt");
    let loader = TableLoader::new(LoaderConfig::header_metadata());
    match loader.load(&missing) {
        Err(MsiError::SourceNotFound(p)) => assert_eq!(p, missing),
        other => panic!("expected SourceNotFound, got {other:?}"),
    }

    // The caller can simply retry with another path.
    let path = write(tmpdir.path(), "export.txt", EXPORT);
    assert_eq!(loader.load(&path).unwrap().len(), 2);
}

#[test]
fn test_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmpdir = tempfile::tempdir()?;
    let config_path = write(
        tmpdir.path(),
        "loader.json",
        r#"{"layout": {"kind": "cleaned"}, "delimiter": ";"}"#,
    );
    let data_path = write(tmpdir.path(), "table.csv", "Index;X;Y;500.1\n0;2;4;8.5\n");

    let config = LoaderConfig::from_json_file(&config_path)?;
    let table = TableLoader::new(config).load(&data_path)?;
    assert_eq!(table.channels(), &["500.1"]);
    assert_eq!(table.value(Coord::new(2, 4), "500.1"), Some(8.5));
    Ok(())
}
