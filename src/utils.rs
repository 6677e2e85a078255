//! Helper functions

/// Print a pose, millimeters and degrees.
#[allow(dead_code)]
pub fn dump_pose(pose: &[f64]) {
    let mut row = String::new();
    for (index, value) in pose.iter().enumerate() {
        if index < 3 {
            row.push_str(&format!("{:7.2} ", value));
        } else {
            row.push_str(&format!("{:6.2}deg ", value.to_degrees()));
        }
    }
    println!("[{}]", row.trim_end());
}

/// Print joint values, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joints(joints: &[f64]) {
    let mut row = String::new();
    for angle in joints {
        row.push_str(&format!("{:5.2} ", angle.to_degrees()));
    }
    println!("[{}]", row.trim_end());
}

/// Allows specifying joint values in degrees (converts to radians).
#[allow(dead_code)]
pub fn as_radians<const N: usize>(degrees: [i32; N]) -> Vec<f64> {
    degrees.iter().map(|d| (*d as f64).to_radians()).collect()
}
