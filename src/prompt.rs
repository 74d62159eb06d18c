use std::io::{self, BufRead, Write};

/// Line-based terminal I/O shared by the menus and the turn loop.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()
    }

    /// Prints `question` and returns the trimmed reply. EOF is an error.
    pub fn read_answer(&mut self, question: &str) -> io::Result<String> {
        self.print(question)?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Asks until the upper-cased reply is one of `options` or `extra`.
    pub fn ask_for<S: AsRef<str>>(
        &mut self,
        question: &str,
        options: &[S],
        extra: Option<&str>,
    ) -> io::Result<String> {
        let accepts = |answer: &str| {
            options.iter().any(|o| o.as_ref() == answer) || extra == Some(answer)
        };
        let mut answer = self.read_answer(question)?.to_uppercase();
        while !accepts(&answer) {
            answer = self.read_answer("Wrong choice! Repeat input: ")?.to_uppercase();
        }
        Ok(answer)
    }
}
