fn main() {
    let _shadow = shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("shadow-rs should generate build metadata");
}
