/// Example: print the book example and one pipeline trace without a terminal UI
///
/// Usage: cargo run --example pipeline_trace -- [x y z]
use std::env;

use mlab_core::{Lab, Viewport};
use nalgebra::Point3;

fn main() {
    let args: Vec<f32> = env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let world = match args.as_slice() {
        [x, y, z] => Point3::new(*x, *y, *z),
        _ => Point3::new(0.5, 0.5, 0.0),
    };

    let lab = Lab::default();
    let scene = &lab.scene;
    println!("v-basis: {:?}", scene.v_basis.vectors());
    println!("u-basis: {:?}", scene.u_basis.vectors());
    println!("a = {:?}  ->  w = {:?}", scene.a.as_slice(), scene.w.as_slice());
    println!("b = {:?}", scene.b.as_slice());

    let frame = lab.frame(&Viewport::new(800, 600));
    let trace = frame.trace(&world);
    println!();
    println!("world  {:?}", trace.world.coords.as_slice());
    println!("view   {:?}", trace.view.as_slice());
    println!("clip   {:?}", trace.clip.as_slice());
    println!("ndc    {:?}", trace.ndc.as_slice());
    match trace.screen {
        Some(p) => println!("screen ({:.2}, {:.2})", p.x, p.y),
        None => println!("screen: w too close to zero"),
    }
    println!("inside clip box: {}", trace.inside_clip);
}
