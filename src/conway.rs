//! Conway operators as tile patterns.
//!
//! Named operators map directly to pattern strings; the parametric
//! families (`mN`, `MN`, `oN`, `eN`, `bN`, `gN`, `sN`) generate their
//! patterns by spacing points along barycentric segments and connecting
//! them with stereotyped paths. The generated strings are part of the
//! interface: downstream output depends on them byte for byte, so the
//! generators keep their historical index adjustments.

use glam::DVec3;

use crate::tile::coord_string;
use crate::tiling::TilingError;

/// A named Conway operator.
pub struct ConwayOperator {
    /// Short name accepted by [`conway_pattern`].
    pub short: &'static str,
    /// Descriptive name.
    pub name: &'static str,
    /// The tile pattern the operator expands to.
    pub pattern: &'static str,
}

/// The named operator table.
pub const CONWAY_OPERATORS: [ConwayOperator; 26] = [
    // Equivalent: d, a, S
    ConwayOperator { short: "d", name: "dual", pattern: "[F]0V,0E" },
    ConwayOperator { short: "a", name: "ambo", pattern: "[E]0F,0V" },
    ConwayOperator { short: "S", name: "seed", pattern: "[V]0E,0F" },
    ConwayOperator { short: "j", name: "join", pattern: "[F,V]0_1E" },
    // Equivalent: k, n, u
    ConwayOperator { short: "k", name: "kis", pattern: "[F,V]0_1v1v,1E" },
    ConwayOperator { short: "n", name: "needle", pattern: "[V,F]1f0_1f,1E" },
    ConwayOperator { short: "u", name: "subdivide", pattern: "[V,E]0_1e1e,1F" },
    // Equivalent: t, z, e (tile order to match e0=z and e1=e)
    ConwayOperator { short: "t", name: "truncate", pattern: "[VE]0V0E,0V,0E" },
    ConwayOperator { short: "z", name: "zip", pattern: "[EF]0E0F,0F,0E" },
    ConwayOperator { short: "e", name: "expand", pattern: "[FV]0V,0F,0F0V" },
    // Symmetric: s, m, b
    ConwayOperator { short: "s", name: "snub", pattern: "[VEF]0V,0E,0F,0V0E0F" },
    ConwayOperator { short: "m", name: "meta", pattern: "[V,E,F]*0_1_2" },
    ConwayOperator { short: "b", name: "bevel", pattern: "[VEF]0e0f,0v0e,0f0v" },
    ConwayOperator { short: "o", name: "ortho", pattern: "[V,E,F]1_0e1_2e" },
    ConwayOperator { short: "g", name: "gyro", pattern: "[F,VE,V]1_0F1_2V1E,1E" },
    ConwayOperator { short: "c", name: "chamfer", pattern: "[V,VF]1F,0_1v1f" },
    ConwayOperator { short: "l", name: "loft", pattern: "[V,VF]1F,0_1v1_0v,0E" },
    ConwayOperator { short: "p", name: "propellor", pattern: "[V,VEF]1F,1_0V1E1F,1E" },
    ConwayOperator { short: "q", name: "quinto", pattern: "[V,E,EF]2F,0_1_2e2_1e" },
    ConwayOperator { short: "L0", name: "joined-lace", pattern: "[V,E2F]1F,1e1_0e,1_0E" },
    ConwayOperator { short: "L", name: "lace", pattern: "[V,E2F]1F,1e1_0e,1_0v0v,0E" },
    ConwayOperator { short: "K", name: "stake", pattern: "[V,E2F,F]0_1_2e1e,1_0v0v,0E" },
    ConwayOperator { short: "M", name: "edge-medial", pattern: "[F,3V,V2E]0_2_1e2e,2_0v2v,2E" },
    ConwayOperator { short: "J", name: "joined-medial", pattern: "[F,V,EF]*0_1_2,1_2E" },
    ConwayOperator { short: "X", name: "cross", pattern: "[V,E,F,VF]3_1v3_2v,*0_1_3" },
    ConwayOperator { short: "w", name: "whirl", pattern: "[VF,VE,V]0F,0_1V2_1E1_0F,1E" },
];

/// The named operator table, for listings.
#[must_use]
pub fn conway_operators() -> &'static [ConwayOperator] {
    &CONWAY_OPERATORS
}

/// Resolve an operator string to its tile pattern: a named operator, or a
/// letter from `mMoebgs` followed by a non-negative integer. `L0` is a
/// standalone named operator, not the 0 entry of a sequence.
///
/// # Errors
/// `UnknownOperator` for unresolvable names, `BadOperatorParameter` for a
/// negative number or one outside an operator's range.
pub fn conway_pattern(op: &str) -> Result<String, TilingError> {
    if let Some(entry) = CONWAY_OPERATORS.iter().find(|e| e.short == op) {
        return Ok(entry.pattern.to_string());
    }

    let unknown = || TilingError::UnknownOperator { name: op.to_string() };
    let bad_param = || TilingError::BadOperatorParameter {
        name: op.to_string(),
    };

    let op_char = op.chars().next().ok_or_else(unknown)?;
    let rest = &op[op_char.len_utf8()..];
    let op_int: i64 = rest.parse().map_err(|_| unknown())?;
    if op_int < 0 {
        return Err(bad_param());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = op_int as u32;

    let pat = match op_char {
        'M' => Some(big_m_pattern(n)),
        'm' => Some(m_pattern(n)),
        'o' => Some(o_pattern(n)),
        'e' => Some(e_pattern(n)),
        'b' => Some(b_pattern(n)),
        'g' => g_pattern(n),
        's' => s_pattern(n),
        _ => return Err(unknown()),
    };
    pat.ok_or_else(bad_param)
}

fn coords(v: u32, e: u32, f: u32) -> String {
    coord_string(DVec3::new(f64::from(v), f64::from(e), f64::from(f)))
}

fn big_m_pattern(n: u32) -> String {
    let n = n + 2;

    let mut pat = String::from("[F");
    let mut i = 0;
    while i <= n {
        pat += &format!(",{}", coords(n - i, i, 0));
        i += 2;
    }
    let last_idx = n / 2 + 1;

    pat += "]0_2_1e2e";

    for i in 2..last_idx {
        pat += &format!(",*0_{}_{}", i, i + 1);
    }

    if n % 2 == 1 {
        pat += &format!(",{last_idx}_0v{last_idx}v");
        pat += &format!(",{last_idx}E");
    }

    pat
}

fn m_pattern(n: u32) -> String {
    let n = n + 1;

    let mut pat = String::from("[F");
    let mut i = 0;
    while i <= n {
        pat += &format!(",{}", coords(n - i, i, 0));
        i += 2;
    }
    let last_idx = n / 2 + 1;

    pat.push(']');

    for i in 1..last_idx {
        pat += &format!(",*0_{}_{}", i, i + 1);
    }

    if n % 2 == 1 {
        pat += &format!(",{last_idx}_0v{last_idx}v");
        pat += &format!(",{last_idx}E");
    }

    pat
}

fn o_pattern(n: u32) -> String {
    let n = n + 1;
    let parity = n % 2;

    let mut pat = String::from("[");
    let mut a = 0;
    while a <= n {
        let mut b = 0;
        while b <= a {
            pat += &coords(a + parity - b, b, n - (a + parity));
            pat.push(',');
            b += 2;
        }
        a += 2;
    }
    pat.pop();
    pat.push(']');

    let idx = |a: u32, b: u32| (a / 2 + 1) * a / 4 + b / 2;
    let top = n - parity;

    let mut a = 0;
    while a < top {
        let mut b = 0;
        while b < a {
            pat += &format!(
                "*{}_{}_{}_{},",
                idx(a, b),
                idx(a, b + 2),
                idx(a + 2, b + 4),
                idx(a + 2, b + 2)
            );
            b += 2;
        }
        a += 2;
    }

    let mut a = 0;
    while a < top {
        pat += &format!(
            "{}_{}e{}_{}e,",
            idx(a, 0),
            idx(a + 2, 2),
            idx(a + 2, 0),
            idx(a + 2, 2)
        );
        a += 2;
    }

    if parity == 1 {
        let mut a = 0;
        while a < top {
            pat += &format!(
                "{}_{}v{}_{}v,",
                idx(a, a),
                idx(a + 2, a + 2),
                idx(a + 2, a + 2),
                idx(a, a)
            );
            a += 2;
        }
        pat += &format!("0F,{}E,", idx(n - 1, n - 1));
    }
    pat.pop();

    pat
}

fn e_pattern(n: u32) -> String {
    let parity = n % 2;

    let mut pat = String::from("[");
    let mut a = 0;
    while a <= n {
        let mut b = 0;
        while b <= a {
            pat += &coords(a + parity - b, b, n - (a + parity) + 1);
            pat.push(',');
            b += 2;
        }
        a += 2;
    }
    pat.pop();
    pat.push(']');

    let idx = |a: u32, b: u32| (a / 2 + 1) * a / 4 + b / 2;
    let top = n - parity;

    let mut a = 0;
    while a < top {
        let mut b = 0;
        while b < a {
            pat += &format!(
                "*{}_{}_{}_{},",
                idx(a, b),
                idx(a, b + 2),
                idx(a + 2, b + 4),
                idx(a + 2, b + 2)
            );
            b += 2;
        }
        a += 2;
    }

    let mut a = 0;
    while a < top {
        pat += &format!(
            "{}_{}e{}_{}e,",
            idx(a, 0),
            idx(a + 2, 2),
            idx(a + 2, 0),
            idx(a + 2, 2)
        );
        a += 2;
    }

    let mut b = 0;
    while b < top {
        pat += &format!(
            "{}_{}f{}_{}f,",
            idx(top, b),
            idx(top, b + 2),
            idx(top, b + 2),
            idx(top, b)
        );
        b += 2;
    }

    pat += &format!("{}V,", idx(top, 0));

    if parity == 1 {
        let mut a = 0;
        while a + 1 < n {
            pat += &format!(
                "{}_{}v{}_{}v,",
                idx(a, a),
                idx(a + 2, a + 2),
                idx(a + 2, a + 2),
                idx(a, a)
            );
            a += 2;
        }
        pat += &format!("0F,{}v{}f", idx(n - 1, n - 1), idx(n - 1, n - 1));
    } else {
        pat += &format!("{}E", idx(n, n));
    }

    pat
}

fn b_pattern(n: u32) -> String {
    let n = n + 1;
    let parity = n % 2;

    let mut pat = String::from("[");
    let mut b = 1;
    while b <= n + parity {
        pat += &coords(n - b, b, 1);
        pat.push(',');
        b += 2;
    }
    pat.pop();
    pat.push(']');

    pat += "0e0f,";

    let mut b = 0;
    while b < n + parity {
        pat += &format!("{}_", b / 2);
        b += 2;
    }
    pat.pop();
    pat.push('v');
    let mut b = 0;
    while b + 1 < n {
        pat += &format!("{}_", n / 2 - b / 2 - 1);
        b += 2;
    }
    if pat.ends_with('_') {
        pat.pop();
    }
    pat.push('e');

    let mut b = 0;
    while i64::from(b) < i64::from(n) - 2 + i64::from(parity) {
        pat += &format!(",{}_{}f{}_{}f", b / 2, b / 2 + 1, b / 2 + 1, b / 2);
        b += 2;
    }
    if parity == 1 {
        pat += &format!(",{}E", n / 2);
    } else {
        pat += &format!(",{}v{}f", n / 2 - 1, n / 2 - 1);
    }

    pat
}

fn g_pattern(n: u32) -> Option<String> {
    if n < 1 {
        return None; // number out of range
    }

    let mut pat = String::from("[V");
    let divs = 2 * n + 1;
    for b in 0..n {
        let e_coord = 2 * (b + 1);
        pat += &format!(",{}", coords(divs - e_coord, e_coord, 0));
    }
    pat += ",F]";

    let f_idx = n + 1;

    if n == 1 {
        pat += "1_2F1_0V1E";
    } else {
        pat += &format!("{f_idx}_1_0e1_2e");
    }

    for b in 0..n.saturating_sub(1) {
        pat += &format!(",{f_idx}");
        let div_start = 2 * b + 1;
        let mut past_center = false;
        for i in 0..3 {
            let div = div_start + i;
            let mut op = '_';
            if div > n && !past_center {
                op = 'v';
                past_center = true;
            }
            let shown = if div <= n { div } else { 2 * n + 1 - div };
            pat += &format!("{op}{shown}");
        }
        if past_center {
            pat.push('v');
        }
    }

    pat += &format!(",{n}E");

    Some(pat)
}

fn s_pattern(n: u32) -> Option<String> {
    if n < 1 {
        return None; // number out of range
    }

    let mut pat = String::from("[");
    let divs = n;
    for b in 0..=n / 2 {
        let e_coord = 2 * b;
        pat += &coords(divs - e_coord, e_coord, 1);
        pat.push(',');
    }
    pat.pop();
    pat.push(']');

    let div2idx = |i: u32| if i <= n / 2 { i } else { n - i };

    pat += &format!("0V,{}E,", n / 2);

    let mut past_center = false;
    for b in 0..n {
        let mut op = if b > 0 { "_" } else { "" };
        if 2 * b > n && !past_center {
            op = "v";
            past_center = true;
        }
        pat += &format!("{op}{}", div2idx(b));
    }
    if past_center {
        pat.push('v');
    }
    pat.push('F');

    for b in 0..n / 2 {
        pat += &format!(
            ",{}_{}f{}f",
            div2idx(b),
            div2idx(b + 1),
            div2idx(n - (b + 1))
        );
        pat += &format!(
            ",{}_f{}_{}f",
            div2idx(b),
            div2idx(n - (b + 1)),
            div2idx(n - b)
        );
    }
    if n % 2 == 1 {
        pat += &format!(
            ",{}f{}v{}vf",
            div2idx(n / 2),
            div2idx(n - n / 2),
            div2idx(n - (n / 2 + 1))
        );
    }

    Some(pat)
}
