//! Parser for the circuit text format.
//!
//! A circuit file is a `qubits N;` header followed by one gate statement
//! per line: a mnemonic, optional parenthesized angle parameters, and the
//! space-separated qubit operands, e.g.
//!
//! ```text
//! qubits 4;
//! h 0;
//! cx 0 1;
//! rz(0.785398) 3;
//! ccx 0 1 2;
//! ```
//!
//! Blank lines and `//` comments are ignored. Qubit indices must lie below
//! the declared register size.

use anyhow::{Context, Result, bail};
use nom::IResult;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, char, digit1, space0, space1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::{delimited, preceded, tuple};

use qoc_common::{Circuit, Gate, GateKind};

fn kind_from_mnemonic(name: &str) -> Option<GateKind> {
    let kind = match name {
        "h" => GateKind::H,
        "x" => GateKind::X,
        "y" => GateKind::Y,
        "z" => GateKind::Z,
        "s" => GateKind::S,
        "sdg" => GateKind::Sdg,
        "t" => GateKind::T,
        "tdg" => GateKind::Tdg,
        "sx" => GateKind::Sx,
        "rx" => GateKind::Rx,
        "ry" => GateKind::Ry,
        "rz" => GateKind::Rz,
        "p" => GateKind::P,
        "cx" => GateKind::Cx,
        "cz" => GateKind::Cz,
        "cp" => GateKind::Cp,
        "swap" => GateKind::Swap,
        "ccx" => GateKind::Ccx,
        "measure" => GateKind::Measure,
        _ => return None,
    };
    Some(kind)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn params(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        char('('),
        separated_list1(tuple((space0, char(','), space0)), double),
        char(')'),
    )(input)
}

fn header(input: &str) -> IResult<&str, usize> {
    all_consuming(delimited(
        space0,
        preceded(tuple((tag("qubits"), space1)), index),
        tuple((space0, char(';'), space0)),
    ))(input)
}

#[allow(clippy::type_complexity)]
fn statement(input: &str) -> IResult<&str, (&str, Option<Vec<f64>>, Vec<usize>)> {
    all_consuming(delimited(
        space0,
        tuple((
            alpha1,
            opt(params),
            preceded(space1, separated_list1(space1, index)),
        )),
        tuple((space0, char(';'), space0)),
    ))(input)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
    .trim()
}

/// Parses a full circuit description.
pub fn parse_circuit(source: &str) -> Result<Circuit> {
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(no, line)| (no + 1, strip_comment(line)))
        .filter(|(_, line)| !line.is_empty());

    let (no, first) = lines.next().context("empty circuit description")?;
    let (_, num_qubits) = header(first)
        .map_err(|_| anyhow::anyhow!("line {no}: expected `qubits N;` header, got `{first}`"))?;

    let mut circ = Circuit::new(num_qubits);
    for (no, line) in lines {
        let (_, (name, params, qubits)) =
            statement(line).map_err(|_| anyhow::anyhow!("line {no}: malformed statement `{line}`"))?;

        let kind = kind_from_mnemonic(name)
            .with_context(|| format!("line {no}: unknown gate `{name}`"))?;
        let params = params.unwrap_or_default();

        if params.len() != kind.num_params() {
            bail!(
                "line {no}: `{name}` takes {} parameter(s), got {}",
                kind.num_params(),
                params.len()
            );
        }
        if qubits.len() != kind.arity() {
            bail!(
                "line {no}: `{name}` acts on {} qubit(s), got {}",
                kind.arity(),
                qubits.len()
            );
        }
        for (i, &q) in qubits.iter().enumerate() {
            if q >= num_qubits {
                bail!("line {no}: qubit {q} out of range for a {num_qubits}-qubit register");
            }
            if qubits[..i].contains(&q) {
                bail!("line {no}: duplicated qubit {q}");
            }
        }

        circ.push(Gate::new(kind, params, qubits));
    }
    Ok(circ)
}

/// Renders a circuit back into the text format.
pub fn format_circuit(circ: &Circuit) -> String {
    let mut out = format!("qubits {};\n", circ.num_qubits);
    for gate in &circ.gates {
        out.push_str(gate.kind.mnemonic());
        if !gate.params.is_empty() {
            let params: Vec<String> = gate.params.iter().map(|p| format!("{p}")).collect();
            out.push_str(&format!("({})", params.join(", ")));
        }
        for q in &gate.qubits {
            out.push_str(&format!(" {q}"));
        }
        out.push_str(";\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gates_params_and_comments() {
        let src = "\
// bell pair plus a rotation
qubits 3;

h 0;
cx 0 1; // entangle
rz(0.5) 2;
cp(1.25) 0 2;
";
        let circ = parse_circuit(src).unwrap();
        assert_eq!(circ.num_qubits, 3);
        assert_eq!(circ.gates.len(), 4);
        assert_eq!(circ.gates[0], Gate::h(0));
        assert_eq!(circ.gates[1], Gate::cx(0, 1));
        assert_eq!(circ.gates[2], Gate::rz(0.5, 2));
        assert_eq!(circ.gates[3].kind, GateKind::Cp);
        assert_eq!(circ.gates[3].params, vec![1.25]);
    }

    #[test]
    fn round_trips_through_format() {
        let src = "qubits 4;\nh 0;\nrz(0.25) 1;\nccx 0 1 2;\nswap 2 3;\n";
        let circ = parse_circuit(src).unwrap();
        assert_eq!(parse_circuit(&format_circuit(&circ)).unwrap(), circ);
    }

    #[test]
    fn rejects_missing_header() {
        assert!(parse_circuit("h 0;\n").is_err());
    }

    #[test]
    fn rejects_unknown_gate() {
        let err = parse_circuit("qubits 2;\nfoo 0;\n").unwrap_err();
        assert!(err.to_string().contains("unknown gate"));
    }

    #[test]
    fn rejects_out_of_range_qubit() {
        let err = parse_circuit("qubits 2;\ncx 0 2;\n").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_wrong_arity_and_params() {
        assert!(parse_circuit("qubits 2;\ncx 0;\n").is_err());
        assert!(parse_circuit("qubits 2;\nrz 0;\n").is_err());
        assert!(parse_circuit("qubits 2;\nh(0.5) 0;\n").is_err());
    }

    #[test]
    fn negative_angles_parse() {
        let circ = parse_circuit("qubits 1;\nrx(-1.5e-2) 0;\n").unwrap();
        assert_eq!(circ.gates[0].params, vec![-1.5e-2]);
    }
}
