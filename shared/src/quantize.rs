//! Packing helpers for compact record fields: angles, directions,
//! positions and unit values squeezed into bytes and shorts.

pub type Vec3 = [f32; 3];

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

fn normalize(value: Vec3) -> Vec3 {
    let length = (value[0] * value[0] + value[1] * value[1] + value[2] * value[2]).sqrt();
    if length <= f32::EPSILON {
        return [0.0; 3];
    }
    [value[0] / length, value[1] / length, value[2] / length]
}

// Angles

pub fn byte_rot_in(angle: f32) -> u8 {
    ((wrap_degrees(angle) / 360.0) * u8::MAX as f32) as u8
}

pub fn byte_rot_out(rot: u8) -> f32 {
    (rot as f32 / u8::MAX as f32) * 360.0
}

pub fn byte_rot3_in(angles: Vec3) -> [u8; 3] {
    angles.map(byte_rot_in)
}

pub fn byte_rot3_out(rot: [u8; 3]) -> Vec3 {
    rot.map(byte_rot_out)
}

pub fn short_rot_in(angles: Vec3) -> [i16; 3] {
    angles.map(|angle| ((wrap_degrees(angle) / 360.0) * i16::MAX as f32) as i16)
}

pub fn short_rot_out(rot: [i16; 3]) -> Vec3 {
    rot.map(|value| (value as f32 / i16::MAX as f32) * 360.0)
}

// Directions

pub fn byte_dir_in(direction: Vec3) -> [i8; 3] {
    normalize(direction).map(|value| (value * i8::MAX as f32) as i8)
}

pub fn byte_dir_out(direction: [i8; 3]) -> Vec3 {
    normalize(direction.map(|value| value as f32 / i8::MAX as f32))
}

pub fn short_dir_in(direction: Vec3) -> [i16; 3] {
    normalize(direction).map(|value| (value * i16::MAX as f32) as i16)
}

pub fn short_dir_out(direction: [i16; 3]) -> Vec3 {
    normalize(direction.map(|value| value as f32 / i16::MAX as f32))
}

// Positions

/// Positions beyond `max_range` on any axis are clamped to it
pub fn short_pos_in(position: Vec3, max_range: f32) -> [i16; 3] {
    position.map(|value| ((value / max_range).clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
}

pub fn short_pos_out(position: [i16; 3], max_range: f32) -> Vec3 {
    position.map(|value| (value as f32 / i16::MAX as f32) * max_range)
}

pub fn is_position_valid(position: Vec3) -> bool {
    position.iter().all(|value| !value.is_nan())
}

/// Extrapolates a position along its last known heading, compensating
/// for the time the update spent in flight
pub fn predicted_position(
    last_position: Vec3,
    last_direction: Vec3,
    speed_per_second: f32,
    last_time: f32,
    current_time: f32,
    latency: f32,
) -> Vec3 {
    let direction = normalize(last_direction);
    let elapsed = current_time - (last_time - latency);
    let mut predicted = last_position;
    for axis in 0..3 {
        predicted[axis] += direction[axis] * speed_per_second * elapsed;
    }
    predicted
}

// Unit values

pub fn byte_val_in(value: f32, max_value: f32) -> u8 {
    ((value / max_value).clamp(0.0, 1.0) * u8::MAX as f32) as u8
}

pub fn byte_val_out(value: u8, max_value: f32) -> f32 {
    (value as f32 / u8::MAX as f32) * max_value
}

pub fn ushort_val_in(value: f32, max_value: f32) -> u16 {
    ((value / max_value).clamp(0.0, 1.0) * u16::MAX as f32) as u16
}

pub fn ushort_val_out(value: u16, max_value: f32) -> f32 {
    (value as f32 / u16::MAX as f32) * max_value
}
