//! Per-level conversion script emitter.
//!
//! After a level's tiles have settled, the engine drops a `convert.sh`
//! into the level directory. The script mosaics the level's tiles into a
//! single georeferenced raster with GDAL; running it is the user's call
//! and out of scope here.

use std::fs;
use std::io;
use std::path::Path;

/// File name of the emitted script inside each level directory.
pub const SCRIPT_FILE_NAME: &str = "convert.sh";

/// Renders the conversion script body.
///
/// The template is fixed apart from the coordinate-system identifier: it
/// enumerates the level's tile images, builds a virtual mosaic with an
/// added alpha channel, translates the mosaic into a GeoTIFF tagged with
/// the identifier, and removes its own intermediate artifacts.
pub fn conversion_script(coordinate_system: &str) -> String {
    format!(
        "#!/bin/sh\n\
         # Mosaic this level's tiles into one georeferenced raster.\n\
         set -e\n\
         cd \"$(dirname \"$0\")\"\n\
         ls -1 | grep -E '^R[0-9A-F]{{8}}C[0-9A-F]{{8}}\\.(png|jpeg)$' > tiles.txt\n\
         gdalbuildvrt -addalpha -input_file_list tiles.txt mosaic.vrt\n\
         gdal_translate -of GTiff -a_srs \"{coordinate_system}\" mosaic.vrt mosaic.tif\n\
         rm -f tiles.txt mosaic.vrt\n"
    )
}

/// Writes the conversion script for one level directory.
///
/// On unix the script is made executable.
pub fn write_conversion_script(level_dir: &Path, coordinate_system: &str) -> io::Result<()> {
    let path = level_dir.join(SCRIPT_FILE_NAME);
    fs::write(&path, conversion_script(coordinate_system))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_parameterized_by_srs_only() {
        let a = conversion_script("EPSG:3857");
        let b = conversion_script("EPSG:25832");
        assert!(a.contains("\"EPSG:3857\""));
        assert!(b.contains("\"EPSG:25832\""));
        assert_eq!(
            a.replace("EPSG:3857", "X"),
            b.replace("EPSG:25832", "X"),
        );
    }

    #[test]
    fn test_script_builds_alpha_mosaic_and_cleans_up() {
        let body = conversion_script("EPSG:3857");
        assert!(body.starts_with("#!/bin/sh\n"));
        assert!(body.contains("gdalbuildvrt -addalpha"));
        assert!(body.contains("gdal_translate"));
        assert!(body.contains("-a_srs"));
        assert!(body.contains("rm -f tiles.txt mosaic.vrt"));
    }

    #[test]
    fn test_script_globs_both_image_kinds() {
        let body = conversion_script("EPSG:3857");
        assert!(body.contains("(png|jpeg)"));
    }

    #[test]
    fn test_write_creates_executable_script() {
        let dir = tempfile::tempdir().unwrap();
        write_conversion_script(dir.path(), "EPSG:3857").unwrap();

        let path = dir.path().join(SCRIPT_FILE_NAME);
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111, "script should be executable");
        }
    }
}
