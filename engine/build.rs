use std::{env, fs::File, io::Write, path::Path};

fn main() {
    // write build time info
    built::write_built_file().expect("Failed to acquire build-time information");

    // Experimental parameters can be overridden through env vars at build time.
    // If the env var is set, we write the value into OUT_DIR and enable a cfg flag.
    // The module where the parameter is used either defines the default
    // or includes the file created here.
    let out_dir = env::var("OUT_DIR").unwrap();

    if let Ok(val) = env::var("DOWN_DFS_REFINE_MIN_DEGREE") {
        let dest_path = Path::new(&out_dir).join("DOWN_DFS_REFINE_MIN_DEGREE");
        let mut f = File::create(&dest_path).unwrap();
        f.write_all(val.as_bytes()).unwrap();
        println!("cargo:rustc-cfg=override_refine_min_degree");
    }
    println!("cargo:rerun-if-env-changed=DOWN_DFS_REFINE_MIN_DEGREE");
    println!("cargo:rustc-check-cfg=cfg(override_refine_min_degree)");
}
