//! 音乐目录工具：按艺人查专辑/曲目、按流派推荐、按歌名查找（只读）

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::{Database, Row};
use crate::tools::descriptor::{params_schema, ParamKind, ParamSpec, ToolArgs};
use crate::tools::Tool;

/// 按流派推荐时的歌曲上限（每位艺人最多一首）
pub const GENRE_SONG_LIMIT: usize = 8;

fn like_pattern(text: &str) -> String {
    format!("%{}%", text.trim())
}

fn rows_to_text(rows: &[Row]) -> String {
    serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string())
}

const ARTIST_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "artist",
    ParamKind::String,
    "Artist name or part of it",
)];

pub struct AlbumsByArtistTool {
    db: Arc<Database>,
}

impl AlbumsByArtistTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for AlbumsByArtistTool {
    fn name(&self) -> &str {
        "get_albums_by_artist"
    }

    fn description(&self) -> &str {
        "Get albums by an artist. Returns: a JSON list of {Title, Name} rows."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(ARTIST_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(ARTIST_PARAMS, &args)?;
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT Album.Title, Artist.Name
                 FROM Album
                 JOIN Artist ON Album.ArtistId = Artist.ArtistId
                 WHERE Artist.Name LIKE ?1
                 ORDER BY Album.AlbumId",
                vec![like_pattern(args.str("artist")).into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(rows_to_text(&rows))
    }
}

pub struct TracksByArtistTool {
    db: Arc<Database>,
}

impl TracksByArtistTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for TracksByArtistTool {
    fn name(&self) -> &str {
        "get_tracks_by_artist"
    }

    fn description(&self) -> &str {
        "Get songs by an artist (or similar artists). Returns: a JSON list of {SongName, ArtistName} rows."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(ARTIST_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(ARTIST_PARAMS, &args)?;
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT Track.Name AS SongName, Artist.Name AS ArtistName
                 FROM Album
                 LEFT JOIN Artist ON Album.ArtistId = Artist.ArtistId
                 LEFT JOIN Track ON Track.AlbumId = Album.AlbumId
                 WHERE Artist.Name LIKE ?1
                 ORDER BY Track.TrackId",
                vec![like_pattern(args.str("artist")).into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(rows_to_text(&rows))
    }
}

const GENRE_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "genre",
    ParamKind::String,
    "The genre of the songs to fetch",
)];

pub struct SongsByGenreTool {
    db: Arc<Database>,
}

impl SongsByGenreTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for SongsByGenreTool {
    fn name(&self) -> &str {
        "get_songs_by_genre"
    }

    fn description(&self) -> &str {
        "Fetch songs from the database that match a specific genre, at most one song per artist and 8 songs in total. \
         Returns: a JSON list of {Song, Artist} objects, or a message when nothing matches."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(GENRE_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(GENRE_PARAMS, &args)?;
        let genre = args.str("genre");
        // MIN(TrackId) 让 SQLite 的裸列取每位艺人编号最小的那首
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT Track.Name AS Song, Artist.Name AS Artist, MIN(Track.TrackId) AS FirstTrack
                 FROM Track
                 LEFT JOIN Album ON Track.AlbumId = Album.AlbumId
                 LEFT JOIN Artist ON Album.ArtistId = Artist.ArtistId
                 WHERE Track.GenreId IN (SELECT GenreId FROM Genre WHERE Name LIKE ?1)
                 GROUP BY Artist.ArtistId
                 ORDER BY Artist.Name
                 LIMIT ?2",
                vec![like_pattern(genre).into(), (GENRE_SONG_LIMIT as i64).into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        if rows.is_empty() {
            return Ok(format!("No songs found for the genre: {genre}"));
        }
        let songs: Vec<Value> = rows
            .into_iter()
            .map(|r| {
                serde_json::json!({
                    "Song": r.get("Song").cloned().unwrap_or(Value::Null),
                    "Artist": r.get("Artist").cloned().unwrap_or(Value::Null),
                })
            })
            .collect();
        Ok(Value::Array(songs).to_string())
    }
}

const SONG_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "song_title",
    ParamKind::String,
    "Song title or part of it",
)];

pub struct CheckForSongsTool {
    db: Arc<Database>,
}

impl CheckForSongsTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for CheckForSongsTool {
    fn name(&self) -> &str {
        "check_for_songs"
    }

    fn description(&self) -> &str {
        "Check if a song exists by its name. Returns: a JSON list of matching track rows (empty when none)."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(SONG_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(SONG_PARAMS, &args)?;
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT * FROM Track WHERE Name LIKE ?1 ORDER BY TrackId",
                vec![like_pattern(args.str("song_title")).into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(rows_to_text(&rows))
    }
}

/// 音乐目录子智能体的全部工具
pub fn music_tools(db: &Arc<Database>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(AlbumsByArtistTool::new(db.clone())),
        Arc::new(TracksByArtistTool::new(db.clone())),
        Arc::new(SongsByGenreTool::new(db.clone())),
        Arc::new(CheckForSongsTool::new(db.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_albums_by_artist_matches_partial_names() {
        let tool = AlbumsByArtistTool::new(db());
        let out = tool.execute(json!({"artist": "AC/"})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Title"], "Let There Be Rock");
        assert_eq!(rows[1]["Name"], "AC/DC");
    }

    #[tokio::test]
    async fn test_songs_by_genre_one_per_artist_and_capped() {
        let tool = SongsByGenreTool::new(db());
        let out = tool.execute(json!({"genre": "rock"})).await.unwrap();
        let songs: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(songs.len(), GENRE_SONG_LIMIT);
        let mut artists: Vec<&str> = songs.iter().map(|s| s["Artist"].as_str().unwrap()).collect();
        artists.dedup();
        assert_eq!(artists.len(), GENRE_SONG_LIMIT);
        assert_eq!(songs[0]["Artist"], "AC/DC");
        assert_eq!(songs[0]["Song"], "For Those About To Rock (We Salute You)");
    }

    #[tokio::test]
    async fn test_songs_by_unknown_genre() {
        let tool = SongsByGenreTool::new(db());
        let out = tool.execute(json!({"genre": "polka"})).await.unwrap();
        assert_eq!(out, "No songs found for the genre: polka");
    }

    #[tokio::test]
    async fn test_check_for_songs_and_bad_args() {
        let tool = CheckForSongsTool::new(db());
        let out = tool.execute(json!({"song_title": "Holiday"})).await.unwrap();
        assert!(out.contains("\"Holiday\""));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(err.contains("song_title"));
    }

    #[tokio::test]
    async fn test_executor_timeout_preempts_a_stuck_query() {
        use crate::core::AgentError;
        use crate::tools::{ToolExecutor, ToolRegistry};

        let db = db();
        let registry = ToolRegistry::from_tools(music_tools(&db)).unwrap();
        let executor = ToolExecutor::new(Arc::new(registry), 0);

        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let holder = Arc::clone(&db);
        let busy = std::thread::spawn(move || {
            let _conn = holder.lock().unwrap();
            locked_tx.send(()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(1500));
        });
        locked_rx.recv().unwrap();

        let started = std::time::Instant::now();
        let err = executor
            .execute("check_for_songs", json!({"song_title": "Holiday"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolTimeout(name) if name == "check_for_songs"));
        assert!(started.elapsed() < std::time::Duration::from_millis(1000));
        busy.join().unwrap();
    }
}
