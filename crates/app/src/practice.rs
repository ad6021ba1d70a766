use std::io::{self, BufRead, Write};

use rand::seq::SliceRandom;

use langapp_core::model::{
    MatchingPairsData, MultipleChoiceData, SentenceBuildingData, Task, TaskKind, WordExpression,
};
use services::LessonStore;

/// Which side of a word the learner is shown for a multiple-choice prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Show the source word, answer with the target expression.
    To,
    /// Show the target expression, answer with the source word.
    From,
}

/// Terminal front end for a loaded lesson session.
pub struct Practice<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Practice<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Drive the session in `lessons` until it finishes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the terminal is closed mid-lesson.
    pub async fn run(&mut self, lessons: &LessonStore) -> io::Result<()> {
        if let Some(lesson) = lessons.current_lesson() {
            writeln!(self.output, "{} · {}", lesson.section.title, lesson.title)?;
            if !lesson.subtitle.is_empty() {
                writeln!(self.output, "{}", lesson.subtitle)?;
            }
        }

        while !lessons.is_session_finished() {
            if lessons.show_correction_intro() {
                let replay = lessons.state().session.queue().len();
                writeln!(
                    self.output,
                    "\nLet's go over the {replay} task(s) you missed."
                )?;
                lessons.start_correction();
            }

            if let Some(task) = lessons.active_task() {
                writeln!(self.output, "\n[{:>3}%]", lessons.session_progress())?;
                let correct = self.ask(&task)?;
                lessons.register_result(correct);
            }
            lessons.proceed().await;
        }

        writeln!(
            self.output,
            "\nLesson finished: {}/{} right on the first try.",
            lessons.correct_count(),
            lessons.initial_task_count()
        )?;
        Ok(())
    }

    fn ask(&mut self, task: &Task) -> io::Result<bool> {
        match &task.kind {
            TaskKind::TranslateWordTo(data) => self.multiple_choice(data, Direction::To),
            TaskKind::TranslateWordFrom(data) => self.multiple_choice(data, Direction::From),
            TaskKind::SentenceBuilding(data) => self.sentence(data),
            TaskKind::MatchingPairs(data) => self.matching(data),
            TaskKind::Unknown { task_type, .. } => {
                tracing::warn!(task = %task.id, task_type = %task_type, "skipping unsupported task");
                writeln!(self.output, "(skipping unsupported {task_type} task)")?;
                Ok(true)
            }
        }
    }

    fn multiple_choice(
        &mut self,
        data: &MultipleChoiceData,
        direction: Direction,
    ) -> io::Result<bool> {
        let mut options = data.options();
        options.shuffle(&mut rand::rng());

        writeln!(self.output, "Translate: {}", prompt_side(&data.question_word, direction))?;
        for (n, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", n + 1, answer_side(option, direction))?;
        }

        let pick = self.read_choice(options.len())?;
        let correct = data.is_correct(options[pick]);
        if correct {
            writeln!(self.output, "Correct!")?;
        } else {
            writeln!(
                self.output,
                "Not quite. Answer: {}",
                answer_side(&data.question_word, direction)
            )?;
        }
        Ok(correct)
    }

    /// The correct word order is only known to the server, so the learner grades themselves.
    fn sentence(&mut self, data: &SentenceBuildingData) -> io::Result<bool> {
        writeln!(self.output, "{}", data.prompt)?;
        writeln!(self.output, "Words: {}", data.words.join(" / "))?;
        self.read_line("Your sentence: ")?;
        self.confirm("Was it right? [y/N] ")
    }

    fn matching(&mut self, data: &MatchingPairsData) -> io::Result<bool> {
        let mut right: Vec<&WordExpression> = data.right_items.iter().collect();
        right.shuffle(&mut rand::rng());
        if right.is_empty() || data.left_items.is_empty() {
            writeln!(self.output, "(nothing to match)")?;
            return Ok(true);
        }

        writeln!(self.output, "Match each word:")?;
        for (n, item) in right.iter().enumerate() {
            writeln!(self.output, "  {}) {}", n + 1, item.origin)?;
        }

        let mut all_correct = true;
        for left in &data.left_items {
            writeln!(self.output, "{}", left.expression)?;
            let pick = self.read_choice(right.len())?;
            if !is_pair(left, right[pick]) {
                all_correct = false;
            }
        }
        if all_correct {
            writeln!(self.output, "Correct!")?;
        } else {
            writeln!(self.output, "Some pairs were wrong.")?;
        }
        Ok(all_correct)
    }

    // ── input ────────────────────────────────────────────────────────

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Zero-based index of the option picked, re-prompting until valid.
    fn read_choice(&mut self, count: usize) -> io::Result<usize> {
        loop {
            let line = self.read_line("> ")?;
            if let Some(index) = parse_choice(&line, count) {
                return Ok(index);
            }
            writeln!(self.output, "Enter a number from 1 to {count}.")?;
        }
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let line = self.read_line(prompt)?;
        Ok(matches!(line.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

/// Parse a 1-based menu pick into an index below `count`.
fn parse_choice(line: &str, count: usize) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

fn prompt_side(word: &WordExpression, direction: Direction) -> &str {
    match direction {
        Direction::To => &word.origin,
        Direction::From => &word.expression,
    }
}

fn answer_side(word: &WordExpression, direction: Direction) -> &str {
    match direction {
        Direction::To => &word.expression,
        Direction::From => &word.origin,
    }
}

fn is_pair(left: &WordExpression, right: &WordExpression) -> bool {
    left.expression == right.expression && left.origin == right.origin
}
