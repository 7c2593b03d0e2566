use std::{fs::File, io::BufReader, path::Path};

use crate::{Aig, Result, aig::error::ParserError};

fn read_u64(s: &str) -> std::result::Result<u64, ParserError> {
    s.parse::<u64>()
        .map_err(|_| ParserError::InvalidToken(s.to_string() + " expected u64"))
}

fn check_even(x: u64) -> Result<()> {
    if x & 1 == 1 {
        return Err(ParserError::InvalidToken(
            "expected literal to be even, got ".to_string() + &x.to_string(),
        )
        .into());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    m: u64,
    i: u64,
    l: u64,
    o: u64,
    a: u64,
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> std::result::Result<Self, Self::Error> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 6 {
            return Err(ParserError::InvalidToken(
                "missing header tokens".to_string(),
            ));
        }

        if tokens[0] != "aag" {
            return Err(ParserError::InvalidToken(
                "expected aag, got ".to_string() + tokens[0],
            ));
        }

        let m = read_u64(tokens[1])?;
        let i = read_u64(tokens[2])?;
        let l = read_u64(tokens[3])?;
        let o = read_u64(tokens[4])?;
        let a = read_u64(tokens[5])?;

        if tokens.len() > 6 {
            return Err(ParserError::UnsupportedFeature(
                "header only supports M I L O A".to_string(),
            ));
        }

        if l > 0 {
            return Err(ParserError::UnsupportedFeature(
                "latches (sequential circuits)".to_string(),
            ));
        }

        if i + a > m {
            return Err(ParserError::InvalidToken(format!(
                "M={} is smaller than I + A = {}",
                m,
                i + a
            )));
        }

        Ok(Header { m, i, l, o, a })
    }
}

/// Parser for the ASCII AIGER format (combinational subset).
mod ascii {
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read};

    use crate::{
        Aig, AigError, Literal, NodeId, Result,
        aig::error::ParserError,
        aig::parser::{Header, check_even, read_u64},
    };

    /// An AND gate as written in the file, fanins not checked yet.
    type AndLine = (NodeId, Literal, Literal);

    fn read_line(reader: &mut BufReader<impl Read>, line: &mut String) -> Result<()> {
        line.clear();
        if reader.read_line(line)? == 0 {
            return Err(ParserError::InvalidToken("unexpected end of file".to_string()).into());
        }
        Ok(())
    }

    fn read_input(line: &str) -> Result<NodeId> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        if tokens.is_empty() {
            return Err(
                ParserError::InvalidToken("expected input token, got nothing".to_string()).into(),
            );
        }

        if tokens.len() > 1 {
            return Err(ParserError::InvalidToken(
                "expected nothing after input, got ".to_string() + tokens[1],
            )
            .into());
        }

        let i = read_u64(tokens[0])?;
        check_even(i)?;
        Ok((i >> 1) as NodeId)
    }

    fn read_output(line: &str) -> Result<Literal> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        if tokens.is_empty() {
            return Err(ParserError::InvalidToken(
                "expected output token, got nothing".to_string(),
            )
            .into());
        }

        if tokens.len() > 1 {
            return Err(ParserError::InvalidToken(
                "expected nothing after output, got ".to_string() + tokens[1],
            )
            .into());
        }

        Ok(Literal::from_raw(read_u64(tokens[0])? as usize))
    }

    fn read_and(line: &str) -> Result<AndLine> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 3 {
            return Err(ParserError::InvalidToken("not enough and tokens".to_string()).into());
        }

        if tokens.len() > 3 {
            return Err(ParserError::InvalidToken(
                "expected nothing after and tokens, got ".to_string() + tokens[3],
            )
            .into());
        }

        let id = read_u64(tokens[0])?;
        let fanin0 = read_u64(tokens[1])?;
        let fanin1 = read_u64(tokens[2])?;

        check_even(id)?;
        Ok((
            (id >> 1) as NodeId,
            Literal::from_raw(fanin0 as usize),
            Literal::from_raw(fanin1 as usize),
        ))
    }

    /// Reads a symbol line (`i0 name`, `o3 name`), returns `None` once the symbol table is over.
    fn read_symbol(line: &str) -> Result<Option<(char, usize, String)>> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut chars = line.chars();
        let kind = match chars.next() {
            None | Some('c') => return Ok(None),
            Some(k @ ('i' | 'o')) => k,
            Some('l') => {
                return Err(ParserError::UnsupportedFeature("latch symbols".to_string()).into());
            }
            Some(_) => {
                return Err(
                    ParserError::InvalidToken("invalid symbol line ".to_string() + line).into(),
                );
            }
        };
        let (position, name) = chars.as_str().split_once(' ').ok_or(
            ParserError::InvalidToken("expected symbol name in ".to_string() + line),
        )?;
        let position = read_u64(position)? as usize;
        Ok(Some((kind, position, name.to_string())))
    }

    /// Instantiates the AND gates so that every gate is created after its fanins,
    /// whatever their order in the file.
    fn add_ands(aig: &mut Aig, ands: Vec<AndLine>) -> Result<()> {
        let mut pending: HashMap<NodeId, (Literal, Literal)> = HashMap::new();
        let mut order = Vec::new();
        for (id, fanin0, fanin1) in ands {
            if pending.insert(id, (fanin0, fanin1)).is_some() || aig.get_node(id).is_some() {
                return Err(AigError::DuplicateId(id));
            }
            order.push(id);
        }

        for root in order {
            // Iterative DFS over the pending gates, fanins first
            let mut stack = vec![(root, false)];
            let mut on_path = Vec::new();
            while let Some((id, expanded)) = stack.pop() {
                let Some(&(fanin0, fanin1)) = pending.get(&id) else {
                    continue;
                };
                if expanded {
                    aig.add_and_with_id(id, fanin0, fanin1)?;
                    pending.remove(&id);
                    on_path.pop();
                    continue;
                }
                if on_path.contains(&id) {
                    return Err(AigError::InvalidState(format!(
                        "and gate {} is part of a cycle",
                        id
                    )));
                }
                on_path.push(id);
                stack.push((id, true));
                for fanin in [fanin1, fanin0] {
                    if pending.contains_key(&fanin.node()) {
                        if on_path.contains(&fanin.node()) {
                            return Err(AigError::InvalidState(format!(
                                "and gate {} is part of a cycle",
                                fanin.node()
                            )));
                        }
                        stack.push((fanin.node(), false));
                    }
                }
            }
        }
        Ok(())
    }

    impl Aig {
        /// Creates an AIG from an open .aag file using ASCII format.
        ///
        /// Node ids are the AIGER variable indices, outputs get the ids `M + 1, ..., M + O`.
        /// Symbols of inputs and outputs become node labels, the comment section is ignored.
        ///
        /// ```rust
        /// use std::io::BufReader;
        /// use fraig::{Aig, Literal};
        /// let file = "aag 3 2 0 1 1\n2\n4\n7\n6 2 5\ni0 a\no0 out\n";
        /// let aig = Aig::from_ascii(BufReader::new(file.as_bytes())).unwrap();
        /// assert_eq!(aig.inputs(), &[1, 2]);
        /// assert_eq!(aig.outputs(), &[4]);
        /// assert_eq!(aig.output_fanin(0), Some(Literal::new(3, true)));
        /// assert_eq!(aig.node(1).unwrap().label(), Some("a"));
        /// ```
        pub fn from_ascii(mut reader: BufReader<impl Read>) -> Result<Self> {
            let mut line: String = String::new();

            // Reading the header
            read_line(&mut reader, &mut line)?;
            let header = Header::try_from(line.as_str())?;
            debug_assert_eq!(header.l, 0);

            let mut aig = Aig::new();
            aig.reserve(header.m as NodeId);

            for _ in 0..header.i {
                read_line(&mut reader, &mut line)?;
                let id = read_input(&line)?;
                if id as u64 > header.m {
                    return Err(ParserError::InvalidToken(format!(
                        "input {} exceeds M={}",
                        id, header.m
                    ))
                    .into());
                }
                aig.add_input_with_id(id)?;
            }

            let mut outputs = Vec::new();
            for _ in 0..header.o {
                read_line(&mut reader, &mut line)?;
                outputs.push(read_output(&line)?);
            }

            let mut ands = Vec::new();
            for _ in 0..header.a {
                read_line(&mut reader, &mut line)?;
                let and = read_and(&line)?;
                if and.0 as u64 > header.m {
                    return Err(ParserError::InvalidToken(format!(
                        "and gate {} exceeds M={}",
                        and.0, header.m
                    ))
                    .into());
                }
                ands.push(and);
            }
            add_ands(&mut aig, ands)?;

            for fanin in outputs {
                aig.add_output(fanin)?;
            }

            // Symbol table, until the comment section or the end of file
            loop {
                line.clear();
                if reader.read_line(&mut line)? == 0 {
                    break;
                }
                let Some((kind, position, name)) = read_symbol(&line)? else {
                    break;
                };
                let list = if kind == 'i' {
                    aig.inputs()
                } else {
                    aig.outputs()
                };
                let id = *list.get(position).ok_or(ParserError::InvalidToken(format!(
                    "symbol {}{} refers to nothing",
                    kind, position
                )))?;
                aig.set_label(id, name)?;
            }

            // Is the AIG okay?
            aig.check_integrity()?;

            Ok(aig)
        }
    }

}

impl Aig {
    /// Creates an AIG from an .aag file using ASCII AIGER format.
    ///
    /// Only combinational circuits are supported, any latch is an
    /// [`UnsupportedFeature`](ParserError::UnsupportedFeature).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("aag") => {
                let f = File::open(path.as_ref())?;
                Aig::from_ascii(BufReader::new(f))
            }
            _ => Err(ParserError::UnsupportedFeature(
                "invalid extension, expected .aag".to_string(),
            )
            .into()),
        }
    }
}
