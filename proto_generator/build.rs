use std::path::PathBuf;
#[allow(clippy::unwrap_used)]
fn main() {
    let out_dir = PathBuf::from("../graphqlmetrics/src/proto");
    let proto_dir = "../proto";

    eprintln!("If you changed a .proto and graphqlmetrics fails to build, build once more.");
    eprintln!("Cargo cannot order these 2 workspace members, since this one is deliberately not a dependency.");
    eprintln!("The output is checked in so graphqlmetrics users never need protoc.");

    tonic_build::configure()
        .build_server(false)
        .out_dir(out_dir)
        .compile(
            &[format!("{proto_dir}/graphqlmetrics/v1/graphqlmetrics.proto")],
            &[proto_dir],
        )
        .unwrap();

    println!("cargo:rerun-if-changed=../proto");
}
