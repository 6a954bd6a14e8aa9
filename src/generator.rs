use std::{future::Future, pin::Pin, task::{Context, Poll}};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc::{self, error::TryRecvError, Receiver, Sender}, task};
use tokio_stream::Stream;
use tracing::{debug, info, instrument, trace};

use crate::{board::Board, crossword::{Crossword, CrosswordError, MAX_WORKING_SIZE}, search::{first_placement, PlacementSearch}, traits::{CrosswordChar, CrosswordString}, word::{Word, WordId}, word_bank::WordBank};

/// Represents all settings for a [generator](CrosswordGenerator).
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosswordGeneratorSettings
{
    /// Width of the working grid words are laid out on before the result is trimmed, at most [MAX_WORKING_SIZE]
    pub working_width: u16,
    /// Height of the working grid words are laid out on before the result is trimmed, at most [MAX_WORKING_SIZE]
    pub working_height: u16,
    /// How many passes to try before giving up, None to keep trying forever
    pub max_attempts: Option<u32>,
    /// Seed for the random source, None to seed from the system
    pub seed: Option<u64>,
    /// Refuse word lists where some word can never cross another one instead of retrying on them
    pub reject_disconnected: bool,
}

impl Default for CrosswordGeneratorSettings
{
    fn default() -> Self
    {
        CrosswordGeneratorSettings
        {
            working_width: 100,
            working_height: 100,
            max_attempts: Some(1000),
            seed: None,
            reject_disconnected: true,
        }
    }
}

impl CrosswordGeneratorSettings
{
    /// Reads settings from json, missing fields take their default values
    ///
    /// ```
    /// # use crossword_layout::generator::CrosswordGeneratorSettings;
    /// let settings = CrosswordGeneratorSettings::from_json(r#"{ "seed": 42, "max_attempts": null }"#).unwrap();
    /// assert_eq!(settings.seed, Some(42));
    /// assert_eq!(settings.max_attempts, None);
    /// assert_eq!(settings.working_width, 100);
    /// ```
    pub fn from_json(json: &str) -> Result<CrosswordGeneratorSettings, CrosswordError>
    {
        Ok(serde_json::from_str(json)?)
    }

    fn rng(&self) -> StdRng
    {
        match self.seed
        {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Outcome of a single pass over the word list
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum PassOutcome
{
    /// Every word is on the board
    Valid,
    /// The iteration budget ran out, the board has to be cleared
    Retry,
}

/// Represents a crossword generator
///
/// Each call to [generate](CrosswordGenerator::generate) shuffles the words, lays them out one by one greedily,
/// and starts over with a new order whenever a pass can't fit every word.
///
/// # Example
/// ```
/// use crossword_layout::generator::{CrosswordGenerator, CrosswordGeneratorSettings};
/// use crossword_layout::word::Word;
///
/// let mut generator = CrosswordGenerator::<u8, String>::default();
/// generator.settings = CrosswordGeneratorSettings { seed: Some(5), ..Default::default() };
/// generator.words = vec![("hello", "greeting"), ("world", "planet"), ("yellow", "color"), ("lower", "beneath")]
///     .into_iter()
///     .map(|(w, d)| Word::new(w.to_owned(), d))
///     .collect();
///
/// let cw = generator.generate().unwrap();
/// assert_eq!(cw.words().len(), 4);
/// assert!(cw.words().iter().all(|w| w.position.x >= 1 && w.position.y >= 1));
/// ```
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub struct CrosswordGenerator<CharT: CrosswordChar, StrT: CrosswordString<CharT>>
{
    pub words: Vec<Word<CharT, StrT>>,
    pub settings: CrosswordGeneratorSettings,
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> CrosswordGenerator<CharT, StrT>
{
    /// Generates a crossword using the random source described by the settings
    ///
    /// # Errors
    ///
    /// [CrosswordError::WorkingGridTooLarge] - a side of the working grid is over [MAX_WORKING_SIZE]
    /// [CrosswordError::EmptyWordList] - there are no words
    /// [CrosswordError::MalformedEntry] - a word is empty, contains a non letter or has no definition
    /// [CrosswordError::WordDoesNotFit] - a word is too long for the working grid
    /// [CrosswordError::Disconnected] - a word can never cross the others (only with [CrosswordGeneratorSettings::reject_disconnected])
    /// [CrosswordError::PlacementFailed] - [CrosswordGeneratorSettings::max_attempts] passes failed
    pub fn generate(&self) -> Result<Crossword<CharT, StrT>, CrosswordError>
    {
        let mut rng = self.settings.rng();
        self.generate_with_rng(&mut rng)
    }

    /// Same as [generate](CrosswordGenerator::generate), but draws from the given random source
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Crossword<CharT, StrT>, CrosswordError>
    {
        self.generate_while(rng, || true)
    }

    /// Generates a crossword, asking `keep_going` before every pass
    ///
    /// When `keep_going` returns false the run ends with [CrosswordError::PlacementFailed].
    #[instrument(skip_all, fields(words = self.words.len()))]
    fn generate_while<R: Rng + ?Sized>(&self, rng: &mut R, mut keep_going: impl FnMut() -> bool) -> Result<Crossword<CharT, StrT>, CrosswordError>
    {
        let mut bank = self.prepare_bank()?;
        let mut board = Board::new(self.settings.working_width, self.settings.working_height);
        let mut attempts = 0u32;

        loop
        {
            if self.settings.max_attempts.is_some_and(|max| attempts >= max)
            {
                debug!(attempts, "giving up");
                return Err(CrosswordError::PlacementFailed { attempts });
            }
            if !keep_going()
            {
                debug!(attempts, "stopped by the caller");
                return Err(CrosswordError::PlacementFailed { attempts });
            }
            attempts += 1;

            board.clear();
            bank.reset();
            bank.shuffle(rng);

            match place_all_words(&mut board, &mut bank, rng)
            {
                PassOutcome::Valid => break,
                PassOutcome::Retry => debug!(attempt = attempts, placed = board.words_on_grid().len(), "pass failed, reshuffling"),
            }
        }

        let crossword = Crossword::compact(&board, &bank);
        let (width, height) = crossword.get_size();
        info!(attempts, width, height, "crossword generated");

        Ok(crossword)
    }

    fn prepare_bank(&self) -> Result<WordBank<CharT, StrT>, CrosswordError>
    {
        let (width, height) = (self.settings.working_width, self.settings.working_height);
        if width > MAX_WORKING_SIZE || height > MAX_WORKING_SIZE
        {
            return Err(CrosswordError::WorkingGridTooLarge { width, height });
        }

        let bank = WordBank::new(self.words.iter().cloned())?;

        let max_len = self.settings.working_width.min(self.settings.working_height) as usize;
        if let Some(index) = self.words.iter().position(|w| w.len() >= max_len)
        {
            return Err(CrosswordError::WordDoesNotFit { index });
        }

        if self.settings.reject_disconnected
        {
            if let Some(index) = bank.find_unreachable()
            {
                return Err(CrosswordError::Disconnected { index });
            }
        }

        Ok(bank)
    }
}

/// One pass: keeps taking the next unplaced word until all are placed or the budget of `n * n` tries runs out
///
/// A word that can't be placed, or whose placement broke the spacing of another word, is moved to the back.
fn place_all_words<CharT: CrosswordChar, StrT: CrosswordString<CharT>, R: Rng + ?Sized>(board: &mut Board<CharT>, bank: &mut WordBank<CharT, StrT>, rng: &mut R) -> PassOutcome
{
    let mut iterations = bank.len() * bank.len();

    while iterations > 0
    {
        let Some(id) = bank.next_unplaced() else { break };

        if place_word(board, bank, id, rng)
        {
            if board.words_on_grid().len() > 1
            {
                if let Some(violated) = board.find_spacing_violation(bank)
                {
                    // the board was valid before this commit, so the newest word is the one to blame
                    let removed = board.rollback_newest(bank);
                    debug_assert_eq!(removed, Some(id));
                    trace!(id, violated, "placement broke spacing of another word");
                    bank.push_to_back(id);
                }
            }
        }
        else
        {
            trace!(id, "no placement found, deferring");
            bank.push_to_back(id);
        }

        iterations -= 1;
    }

    if board.words_on_grid().len() == bank.len() { PassOutcome::Valid } else { PassOutcome::Retry }
}

/// Tries to write the word on the board at its best placement, returns true on success
fn place_word<CharT: CrosswordChar, StrT: CrosswordString<CharT>, R: Rng + ?Sized>(board: &mut Board<CharT>, bank: &mut WordBank<CharT, StrT>, id: WordId, rng: &mut R) -> bool
{
    let placement = if board.words_on_grid().is_empty()
    {
        Some(first_placement(board, bank.get(id).len(), rng))
    }
    else
    {
        PlacementSearch::new(board, bank).best_placement(bank.get(id).letters())
    };

    match placement
    {
        Some(placement) => { board.commit(bank, id, placement); true }
        None => false,
    }
}

impl<CharT: CrosswordChar + 'static, StrT: CrosswordString<CharT> + 'static> CrosswordGenerator<CharT, StrT>
{
    /// Returns a stream that generates crosswords on request, see [CrosswordStream::request_crossword]
    ///
    /// Every crossword is generated independently with the same generator settings, one random source is shared
    /// by the whole stream. If a generation fails, the error is the last item of the stream.
    pub fn crossword_stream(&self) -> CrosswordStream<CharT, StrT>
    {
        let gen = self.clone();

        let gen_func = move |mut rr: Receiver<CrosswordGenerationRequest>, cs: Sender<Result<Crossword<CharT, StrT>, CrosswordError>>| async move
        {
            let mut rng = gen.settings.rng();
            let mut current_request = CrosswordGenerationRequest::Count(0);

            loop
            {
                while let CrosswordGenerationRequest::Count(0) = current_request
                {
                    match rr.recv().await
                    {
                        None | Some(CrosswordGenerationRequest::Stop) => return,
                        Some(req) => current_request = req
                    }
                }

                if let CrosswordGenerationRequest::Endless = current_request
                {
                    match rr.try_recv()
                    {
                        Ok(CrosswordGenerationRequest::Stop) => return,
                        Ok(req) => { current_request = req; continue; }
                        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
                    }
                }

                // a pass never awaits, so a dropped stream or a stop during endless generation is checked between passes
                let mut pending = None;
                let mut cancelled = false;
                let result = gen.generate_while(&mut rng, ||
                {
                    if cs.is_closed() { cancelled = true; }
                    else if current_request == CrosswordGenerationRequest::Endless
                    {
                        match rr.try_recv()
                        {
                            Ok(CrosswordGenerationRequest::Stop) | Err(TryRecvError::Disconnected) => cancelled = true,
                            Ok(req) => pending = Some(req),
                            Err(TryRecvError::Empty) => {}
                        }
                    }
                    !cancelled
                });
                if cancelled { return; }

                let failed = result.is_err();
                if cs.send(result).await.is_err() || failed { return; }

                match pending
                {
                    Some(req) => current_request = req,
                    None => if let CrosswordGenerationRequest::Count(count) = current_request { current_request = CrosswordGenerationRequest::Count(count - 1) },
                }
                task::yield_now().await;
            }
        };

        CrosswordStream::new(gen_func)
    }
}


/// Represents a request to [CrosswordStream] for generating crosswords.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub enum CrosswordGenerationRequest
{
    /// Request to stop the crossword generation.
    #[default]
    Stop,
    /// Request for some count of crosswords to generate.
    Count(u32),
    /// Request for generating crosswords until another request arrives.
    Endless
}

pub struct CrosswordStream<CharT: CrosswordChar + 'static, StrT: CrosswordString<CharT> + 'static>
{
    request_sender: Sender<CrosswordGenerationRequest>,
    crossword_reciever: Receiver<Result<Crossword<CharT, StrT>, CrosswordError>>
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> CrosswordStream<CharT, StrT>
{

    pub fn new<F,Fut>(gen_func: F) -> CrosswordStream<CharT, StrT>
    where
        F: FnOnce(Receiver<CrosswordGenerationRequest>, Sender<Result<Crossword<CharT, StrT>, CrosswordError>>) -> Fut,
        Fut: Future<Output=()> + Send + 'static
    {
        let (rs, rr) = mpsc::channel(100);
        let (cs, cr) = mpsc::channel(100);

        task::spawn(gen_func(rr, cs));

        CrosswordStream { request_sender: rs, crossword_reciever: cr }
    }

    /// Requests crosswords to generate with function like next or take.
    ///
    /// After generating the requested count of crosswords (with [CrosswordGenerationRequest::Count]) the stream will start to wait for other requests, so if you want to only generate for example 10 crosswords, you need to request that, and then request a [CrosswordGenerationRequest::Stop] to end the stream.
    ///
    /// Returns false if the generator already finished and the request was not delivered.
    pub async fn request_crossword(&self, req: CrosswordGenerationRequest) -> bool
    {
        self.request_sender.send(req).await.is_ok()
    }
}

impl<CharT: CrosswordChar, StrT: CrosswordString<CharT>> Stream for CrosswordStream<CharT, StrT>
{
    type Item = Result<Crossword<CharT, StrT>, CrosswordError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>>
    {
        self.crossword_reciever.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tokio_stream::StreamExt;

    use super::*;
    use crate::{placement::WordPlacement, word::{Orientation, Position}};

    fn generator(words: &[(&'static str, &'static str)], seed: u64) -> CrosswordGenerator<u8, &'static str>
    {
        CrosswordGenerator
        {
            words: words.iter().map(|(w, d)| Word::new(*w, *d)).collect(),
            settings: CrosswordGeneratorSettings { seed: Some(seed), ..Default::default() }
        }
    }

    #[test]
    fn test_generate_single_word() {
        for seed in 0..10
        {
            let cw = generator(&[("solitude", "being alone")], seed).generate().unwrap();
            let word = &cw.words()[0];
            assert_eq!(word.position, Position::new(1, 1));
            assert!(word.overlaps.is_empty());
            match word.orientation
            {
                Orientation::Horizontal => assert_eq!(cw.get_size(), (10, 3)),
                Orientation::Vertical => assert_eq!(cw.get_size(), (3, 10)),
                Orientation::Undefined => panic!("placed word without orientation"),
            }
        }
    }

    #[test]
    fn test_generate_is_reproducible_with_seed() {
        let words = [("orange", "fruit"), ("garden", "yard"), ("danger", "peril"), ("range", "scope"), ("anger", "rage")];
        assert_eq!(generator(&words, 11).generate().unwrap(), generator(&words, 11).generate().unwrap());
    }

    #[test]
    fn test_generate_rejects_bad_word_lists() {
        assert!(matches!(generator(&[], 0).generate(), Err(CrosswordError::EmptyWordList)));
        assert!(matches!(generator(&[("abc", "first"), ("xyz", "second")], 0).generate(), Err(CrosswordError::Disconnected { index: 1 })));
        assert!(matches!(generator(&[("cat", "feline"), ("c4r", "vehicle")], 0).generate(), Err(CrosswordError::MalformedEntry { index: 1 })));

        let mut narrow = generator(&[("cat", "feline"), ("carpet", "rug")], 0);
        narrow.settings.working_height = 6;
        assert!(matches!(narrow.generate(), Err(CrosswordError::WordDoesNotFit { index: 1 })));
    }

    #[test]
    fn test_generate_gives_up_after_max_attempts() {
        let mut gen = generator(&[("abc", "first"), ("xyz", "second")], 0);
        gen.settings.reject_disconnected = false;
        gen.settings.max_attempts = Some(25);
        assert!(matches!(gen.generate(), Err(CrosswordError::PlacementFailed { attempts: 25 })));
    }

    #[test]
    fn test_pass_defers_unplaceable_words() {
        let mut bank = WordBank::new([Word::<u8, &str>::new("cat", "feline"), Word::new("xyz", "nothing")]).unwrap();
        let mut board = Board::new(50, 50);
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(place_all_words(&mut board, &mut bank, &mut rng), PassOutcome::Retry);
        assert_eq!(board.words_on_grid(), &[0]);
        assert!(!bank.get(1).is_written());
    }

    #[test]
    fn test_pass_rolls_back_words_breaking_spacing() {
        // "scat" laid along "cat" covers the cell right before it
        let mut bank = WordBank::new([Word::<u8, &str>::new("scat", "dispersed"), Word::new("cat", "feline")]).unwrap();
        let mut board = Board::new(50, 50);
        let mut rng = StdRng::seed_from_u64(0);
        board.commit(&mut bank, 1, WordPlacement::new(Position::new(10, 10), Orientation::Horizontal));

        assert_eq!(place_all_words(&mut board, &mut bank, &mut rng), PassOutcome::Retry);
        assert_eq!(board.words_on_grid(), &[1]);
        assert_eq!(bank.order(), &[1, 0]);
        assert!(!bank.get(0).is_written());
        assert!(bank.get(1).placement().unwrap().overlaps.is_empty());
        assert!(!board.is_occupied(&Position::new(9, 10)));
        assert_eq!(board.find_spacing_violation(&bank), None);
    }

    #[test]
    fn test_generate_stops_when_asked() {
        let mut gen = generator(&[("abc", "first"), ("xyz", "second")], 0);
        gen.settings.reject_disconnected = false;
        gen.settings.max_attempts = None;

        let mut passes_left = 5;
        let result = gen.generate_while(&mut StdRng::seed_from_u64(0), || { passes_left -= 1; passes_left >= 0 });
        assert!(matches!(result, Err(CrosswordError::PlacementFailed { attempts: 5 })));
    }

    #[test]
    fn test_generate_rejects_huge_working_grid() {
        let mut gen = generator(&[("cat", "feline")], 0);
        gen.settings.working_width = u16::MAX;
        assert!(matches!(gen.generate(), Err(CrosswordError::WorkingGridTooLarge { width: u16::MAX, height: 100 })));

        gen.settings.working_width = MAX_WORKING_SIZE;
        assert!(gen.generate().is_ok());
    }

    #[test]
    fn test_generate_crosses_equal_words() {
        for seed in 0..10
        {
            let cw = generator(&[("cat", "feline"), ("cat", "pet")], seed).generate().unwrap();
            let (first, second) = (&cw.words()[0], &cw.words()[1]);
            assert_ne!(first.orientation, second.orientation);
            assert_eq!(first.overlaps, BTreeSet::from([second.id]));
        }
    }

    #[tokio::test]
    async fn test_crossword_stream_count() {
        let gen = generator(&[("cat", "feline"), ("car", "vehicle"), ("tar", "pitch")], 3);

        let mut str = gen.crossword_stream();
        assert!(str.request_crossword(CrosswordGenerationRequest::Count(4)).await);
        assert!(str.request_crossword(CrosswordGenerationRequest::Stop).await);

        let mut crosswords = vec![];
        while let Some(cw) = str.next().await
        {
            crosswords.push(cw.unwrap());
        }

        assert_eq!(crosswords.len(), 4);
        assert!(crosswords.iter().all(|cw| cw.words().len() == 3));
    }

    #[tokio::test]
    async fn test_crossword_stream_endless_until_stopped() {
        let gen = generator(&[("cat", "feline"), ("car", "vehicle")], 8);

        let mut str = gen.crossword_stream();
        str.request_crossword(CrosswordGenerationRequest::Endless).await;

        let first: Vec<_> = (&mut str).take(10).collect().await;
        assert_eq!(first.len(), 10);
        assert!(first.iter().all(|cw| cw.is_ok()));

        str.request_crossword(CrosswordGenerationRequest::Stop).await;
        // whatever was already generated before the stop request is still delivered, then the stream ends
        while str.next().await.is_some() {}
    }

    #[tokio::test]
    async fn test_crossword_stream_ends_on_error() {
        let gen = generator(&[("abc", "first"), ("xyz", "second")], 0);

        let mut str = gen.crossword_stream();
        str.request_crossword(CrosswordGenerationRequest::Count(3)).await;

        assert!(matches!(str.next().await, Some(Err(CrosswordError::Disconnected { index: 1 }))));
        assert!(str.next().await.is_none());
    }
}
