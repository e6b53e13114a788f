use crate::state::Side;

/// Which side acts first.
///
/// Priority decides, then speed. A full tie always goes to side A, which is
/// an approximation: real battles break speed ties at random.
pub fn who_first(priority_a: i8, speed_a: u32, priority_b: i8, speed_b: u32) -> Side {
    if priority_a != priority_b {
        return if priority_a > priority_b { Side::A } else { Side::B };
    }
    if speed_b > speed_a {
        Side::B
    } else {
        Side::A
    }
}
