/*!
Reader for the AIGER format, ASCII (`aag`) and binary (`aig`).

The reader accepts the 1.9 revision of the format: a
`M I L O A [B C J F]` header, the input/latch/output sections, and the
optional bad, constraint, justice, and fairness sections. Symbol tables and
comments are skipped. Binary and-gates are delta coded; the two deltas of
each gate are read as base-128 varints.

Which models the checker accepts (exactly one bad property, no
constraints, …) is not the reader's concern --- see
[BmcSession::new](crate::session::BmcSession::new).
*/

use crate::{
    aig::{self, Aig, AndGate, Latch, NodeKind},
    types::err::{ErrorKind, ParseError},
};

/// Cursor over raw AIGER bytes.
///
/// Everything except the binary and-gate section is line oriented; the
/// and-gate section is read byte by byte.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0, line: 0 }
    }

    /// The next line, without its terminator.
    fn next_line(&mut self) -> Result<&'a str, ParseError> {
        if self.pos >= self.data.len() {
            return Err(ParseError::UnexpectedEnd);
        }
        self.line += 1;
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += end + 1;
        std::str::from_utf8(&rest[..end])
            .map(str::trim_end)
            .map_err(|_| ParseError::Line(self.line))
    }

    fn byte(&mut self) -> Result<u8, ParseError> {
        let b = *self.data.get(self.pos).ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(b)
    }

    /// Decodes one base-128 varint from the binary and-gate section.
    fn delta(&mut self) -> Result<u32, ParseError> {
        let mut value: u32 = 0;
        let mut shift = 0;
        loop {
            let b = self.byte()?;
            if shift == 28 && b & !0x0f != 0 {
                return Err(ParseError::Delta);
            }
            value |= u32::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                return Err(ParseError::Delta);
            }
        }
    }
}

/// Header counts: maximum variable index and the nine section sizes.
struct Header {
    binary: bool,
    maxvar: u32,
    inputs: u32,
    latches: u32,
    outputs: u32,
    ands: u32,
    bad: u32,
    constraints: u32,
    justice: u32,
    fairness: u32,
}

fn header(reader: &mut Reader) -> Result<Header, ParseError> {
    let line = reader.next_line().map_err(|_| ParseError::Header)?;
    let mut tokens = line.split_whitespace();
    let binary = match tokens.next() {
        Some("aag") => false,
        Some("aig") => true,
        _ => return Err(ParseError::Header),
    };
    let mut counts = [0u32; 9];
    let mut seen = 0;
    for slot in counts.iter_mut() {
        match tokens.next() {
            Some(token) => {
                *slot = token.parse().map_err(|_| ParseError::Header)?;
                seen += 1;
            }
            None => break,
        }
    }
    if seen < 5 || tokens.next().is_some() {
        return Err(ParseError::Header);
    }
    let header = Header {
        binary,
        maxvar: counts[0],
        inputs: counts[1],
        latches: counts[2],
        outputs: counts[3],
        ands: counts[4],
        bad: counts[5],
        constraints: counts[6],
        justice: counts[7],
        fairness: counts[8],
    };
    let declared = header.inputs as u64 + header.latches as u64 + header.ands as u64;
    if declared > u64::from(u32::MAX) {
        return Err(ParseError::Counts);
    }
    // The binary format leaves no room for gaps in the variable range.
    if header.binary && declared != u64::from(header.maxvar) {
        return Err(ParseError::Counts);
    }
    if !header.binary && declared > u64::from(header.maxvar) {
        return Err(ParseError::Counts);
    }
    Ok(header)
}

/// Reads an AIGER model from raw bytes.
pub fn read_aiger(bytes: &[u8]) -> Result<Aig, ErrorKind> {
    let mut reader = Reader::new(bytes);
    let header = header(&mut reader)?;
    let maxvar = header.maxvar;

    let mut circuit = Aig::new();
    circuit.maxvar = maxvar;
    let mut kinds: Vec<Option<NodeKind>> = vec![None; maxvar as usize + 1];

    // Local helpers keyed on the running line number of the reader.
    let check_lit = |lit: u32, line: usize| -> Result<aig::Lit, ParseError> {
        if aig::var_of(lit) > maxvar {
            Err(ParseError::Literal(line))
        } else {
            Ok(lit)
        }
    };
    let define = |kinds: &mut Vec<Option<NodeKind>>,
                      lit: aig::Lit,
                      kind: NodeKind,
                      line: usize|
     -> Result<(), ParseError> {
        if aig::is_negated(lit) || lit == aig::FALSE {
            return Err(ParseError::Literal(line));
        }
        let slot = &mut kinds[aig::var_of(lit) as usize];
        if slot.is_some() {
            return Err(ParseError::Redefined(line));
        }
        *slot = Some(kind);
        Ok(())
    };

    // Inputs: one literal per line in ASCII, implicit in binary.
    for index in 0..header.inputs {
        let lit = if header.binary {
            aig::lit_of(index + 1)
        } else {
            let line = reader.next_line()?;
            let lit: u32 = line.trim().parse().map_err(|_| ParseError::Line(reader.line))?;
            check_lit(lit, reader.line)?
        };
        define(&mut kinds, lit, NodeKind::Input(index), reader.line)?;
        circuit.inputs.push(lit);
    }

    // Latches: `lit next [reset]` in ASCII, `next [reset]` in binary.
    for index in 0..header.latches {
        let line = reader.next_line()?;
        let mut tokens = line.split_whitespace();
        let lit = if header.binary {
            aig::lit_of(header.inputs + index + 1)
        } else {
            let token = tokens.next().ok_or(ParseError::Line(reader.line))?;
            let lit: u32 = token.parse().map_err(|_| ParseError::Line(reader.line))?;
            check_lit(lit, reader.line)?
        };
        let next: u32 = tokens
            .next()
            .ok_or(ParseError::Line(reader.line))?
            .parse()
            .map_err(|_| ParseError::Line(reader.line))?;
        let next = check_lit(next, reader.line)?;
        let reset = match tokens.next() {
            None => aig::FALSE,
            Some(token) => {
                let reset: u32 = token.parse().map_err(|_| ParseError::Line(reader.line))?;
                if reset != aig::FALSE && reset != aig::TRUE && reset != lit {
                    return Err(ParseError::Literal(reader.line).into());
                }
                reset
            }
        };
        if tokens.next().is_some() {
            return Err(ParseError::Line(reader.line).into());
        }
        define(&mut kinds, lit, NodeKind::Latch(index), reader.line)?;
        circuit.latches.push(Latch { lit, next, reset });
    }

    // Output, bad, constraint, and fairness sections are one literal per line.
    let literal_section = |reader: &mut Reader, count: u32| -> Result<Vec<aig::Lit>, ParseError> {
        let mut section = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let line = reader.next_line()?;
            let lit: u32 = line.trim().parse().map_err(|_| ParseError::Line(reader.line))?;
            section.push(check_lit(lit, reader.line)?);
        }
        Ok(section)
    };

    circuit.outputs = literal_section(&mut reader, header.outputs)?;
    circuit.bad = literal_section(&mut reader, header.bad)?;
    circuit.constraints = literal_section(&mut reader, header.constraints)?;

    // Justice: the property sizes first, then the literals of each property.
    let mut sizes = Vec::with_capacity(header.justice as usize);
    for _ in 0..header.justice {
        let line = reader.next_line()?;
        let size: u32 = line.trim().parse().map_err(|_| ParseError::Line(reader.line))?;
        sizes.push(size);
    }
    for size in sizes {
        circuit.justice.push(literal_section(&mut reader, size)?);
    }

    circuit.fairness = literal_section(&mut reader, header.fairness)?;

    // And-gates: `lhs rhs0 rhs1` lines in ASCII, delta pairs in binary.
    for index in 0..header.ands {
        let (lhs, rhs0, rhs1) = if header.binary {
            let lhs = aig::lit_of(header.inputs + header.latches + index + 1);
            let delta0 = reader.delta()?;
            let delta1 = reader.delta()?;
            let rhs0 = lhs.checked_sub(delta0).ok_or(ParseError::Delta)?;
            let rhs1 = rhs0.checked_sub(delta1).ok_or(ParseError::Delta)?;
            (lhs, rhs0, rhs1)
        } else {
            let line = reader.next_line()?;
            let mut tokens = line.split_whitespace();
            let mut next = |reader_line: usize| -> Result<u32, ParseError> {
                tokens
                    .next()
                    .ok_or(ParseError::Line(reader_line))?
                    .parse()
                    .map_err(|_| ParseError::Line(reader_line))
            };
            let lhs = check_lit(next(reader.line)?, reader.line)?;
            let rhs0 = check_lit(next(reader.line)?, reader.line)?;
            let rhs1 = check_lit(next(reader.line)?, reader.line)?;
            (lhs, rhs0, rhs1)
        };
        define(&mut kinds, lhs, NodeKind::And(index), reader.line)?;
        circuit.ands.push(AndGate { lhs, rhs0, rhs1 });
    }

    // Anything after the and-gates (symbol table, comments) is skipped.

    // Unused variables are legal in ASCII files; park them as constants
    // and reject them below if anything refers to one.
    circuit.kinds = kinds
        .into_iter()
        .map(|kind| kind.unwrap_or(NodeKind::Constant))
        .collect();

    check_references(&circuit)?;
    Ok(circuit)
}

/// Every literal the model refers to must name a defined node.
fn check_references(circuit: &Aig) -> Result<(), ErrorKind> {
    let defined = |lit: aig::Lit| -> Result<(), ErrorKind> {
        let var = aig::var_of(lit);
        if var != 0 && circuit.kind_of(var) == NodeKind::Constant {
            return Err(ParseError::UndefinedNode(var).into());
        }
        Ok(())
    };
    for latch in circuit.latches() {
        defined(latch.next)?;
    }
    for gate in circuit.ands() {
        defined(gate.rhs0)?;
        defined(gate.rhs1)?;
    }
    for &lit in circuit
        .outputs()
        .iter()
        .chain(circuit.bad())
        .chain(circuit.constraints())
    {
        defined(lit)?;
    }
    Ok(())
}
