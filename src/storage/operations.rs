//! Storage operations
//!
//! Implements list, download, upload and delete on top of OS utilities.
//! Every command runs as the requesting user through `sudo` when
//! impersonation is enabled, so the host enforces permissions.

use log::info;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::FilesystemConfig;
use crate::error::FsError;
use crate::shell::{CommandOutput, CommandRunner, CommandSpec};
use crate::storage::results::{Attachment, FileType, ListOptions, UploadFile};
use crate::storage::validation::{AllowList, basename, join, parent, validate_file_name};

/// Filesystem operations restricted to an allow-list of roots.
#[derive(Clone)]
pub struct FilesystemApi {
    runner: Arc<dyn CommandRunner>,
    allow_list: Arc<AllowList>,
    /// Program used to switch user, `None` when impersonation is off.
    sudo_program: Option<String>,
    username: Option<String>,
}

impl FilesystemApi {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &FilesystemConfig) -> Self {
        Self {
            runner,
            allow_list: Arc::new(AllowList::new(&config.supported_paths)),
            sudo_program: config.impersonate.then(|| config.sudo_program.clone()),
            username: None,
        }
    }

    /// Returns a handle whose commands run as `username`.
    pub fn as_user(&self, username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            ..self.clone()
        }
    }

    /// Allowed root paths.
    pub fn supported_paths(&self) -> &[String] {
        self.allow_list.roots()
    }

    /// Lists the entries of `path`, one per line of `ls` output.
    pub async fn ls(&self, path: &str, options: ListOptions) -> Result<Vec<String>, FsError> {
        let path = self.allow_list.validate(path)?;
        let entries = self.list_entries(&path, options).await?;
        info!("Listed {} ({} entries)", path, entries.len());
        Ok(entries)
    }

    /// Reports whether `path` is a regular file, a directory or something else.
    pub async fn file_type(&self, path: &str) -> Result<FileType, FsError> {
        let path = self.allow_list.validate(path)?;
        self.stat_type(&path).await
    }

    /// Fetches `path` as a downloadable attachment.
    ///
    /// Regular files are returned as-is under their own name; directories are
    /// packed into a gzip-compressed tar stream named `<dir>.tar.gz`.
    pub async fn attachment(&self, path: &str) -> Result<Attachment, FsError> {
        let path = self.allow_list.validate(path)?;
        let file_type = self.stat_type(&path).await?;
        let attachment = self.read_attachment(&path, file_type).await?;
        info!(
            "Prepared attachment {} for {} ({} bytes)",
            attachment.filename,
            path,
            attachment.content.len()
        );
        Ok(attachment)
    }

    /// Writes `files` into the directory `path`.
    ///
    /// Without `update`, a name already present fails the whole batch with
    /// `AlreadyExists`; with `update`, a name that is absent fails with
    /// `NotFound`. A name repeated within `files` is `AlreadyExists`. All
    /// names are checked before anything is written.
    pub async fn upload_files(
        &self,
        path: &str,
        files: Vec<UploadFile>,
        update: bool,
    ) -> Result<Vec<String>, FsError> {
        let dir = self.allow_list.validate(path)?;
        let mut names = HashSet::with_capacity(files.len());
        for file in &files {
            validate_file_name(&file.name)?;
            if !names.insert(file.name.as_str()) {
                return Err(FsError::AlreadyExists(format!(
                    "duplicate file name: {}",
                    file.name
                )));
            }
        }

        // The trailing slash makes ls fail with "Not a directory" on files.
        let listing = ListOptions {
            all: true,
            long: false,
        };
        let existing: HashSet<String> = self
            .list_entries(&format!("{dir}/"), listing)
            .await?
            .into_iter()
            .collect();

        for file in &files {
            let present = existing.contains(&file.name);
            if !update && present {
                return Err(FsError::AlreadyExists("file already exists".into()));
            }
            if update && !present {
                return Err(FsError::NotFound("file does not exist".into()));
            }
        }

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let target = join(&dir, &file.name);
            let size = file.content.len();
            let spec = self
                .command("tee", ["--", target.as_str()])?
                .with_stdin(file.content)
                .discard_stdout();
            self.execute(spec).await?;
            info!(
                "{} {} ({} bytes)",
                if update { "Updated" } else { "Uploaded" },
                target,
                size
            );
            written.push(target);
        }
        Ok(written)
    }

    /// Removes the file at `path`. Directories are refused by `rm` itself.
    pub async fn delete_file(&self, path: &str) -> Result<(), FsError> {
        let path = self.allow_list.validate(path)?;
        self.run("rm", ["--", path.as_str()]).await?;
        info!("Deleted {}", path);
        Ok(())
    }

    async fn list_entries(
        &self,
        target: &str,
        options: ListOptions,
    ) -> Result<Vec<String>, FsError> {
        let mut args = vec![if options.long { "-l" } else { "-1" }];
        if options.all {
            args.push("-A");
        }
        args.extend(["--", target]);

        let output = self.run("ls", args).await?;
        Ok(output
            .text()
            .lines()
            .filter(|line| !line.is_empty())
            .filter(|line| !(options.long && line.starts_with("total ")))
            .map(str::to_owned)
            .collect())
    }

    async fn stat_type(&self, path: &str) -> Result<FileType, FsError> {
        let output = self.run("ls", ["-ld", "--", path]).await?;
        let text = output.text();
        FileType::from_mode(text.trim_start())
            .ok_or_else(|| FsError::Generic(format!("unexpected ls output for {path}")))
    }

    async fn read_attachment(&self, path: &str, file_type: FileType) -> Result<Attachment, FsError> {
        match file_type {
            FileType::Regular => {
                let output = self.run("cat", ["--", path]).await?;
                Ok(Attachment {
                    filename: basename(path).to_string(),
                    content: output.stdout.into(),
                })
            }
            FileType::Directory => {
                let (dir, member) = match basename(path) {
                    "" => ("/", "."),
                    name => (parent(path), name),
                };
                let output = self
                    .run("tar", ["-C", dir, "-czf", "-", "--", member])
                    .await?;
                let stem = if member == "." { "root" } else { member };
                Ok(Attachment {
                    filename: format!("{stem}.tar.gz"),
                    content: output.stdout.into(),
                })
            }
            FileType::Other(_) => Err(FsError::UnsupportedType("unsupported file mode".into())),
        }
    }

    /// Builds the invocation, wrapped in sudo when impersonating.
    fn command<'a, I>(&self, program: &str, args: I) -> Result<CommandSpec, FsError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match &self.sudo_program {
            None => Ok(CommandSpec::new(program, args)),
            Some(sudo) => {
                let user = self.username.as_deref().ok_or_else(|| {
                    FsError::Internal("no user to run the command as".into())
                })?;
                let mut wrapped: Vec<String> = ["-n", "-u", user, "--", program]
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect();
                wrapped.extend(args.into_iter().map(str::to_owned));
                Ok(CommandSpec::new(sudo.as_str(), wrapped))
            }
        }
    }

    async fn run<'a, I>(&self, program: &str, args: I) -> Result<CommandOutput, FsError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let spec = self.command(program, args)?;
        self.execute(spec).await
    }

    async fn execute(&self, spec: CommandSpec) -> Result<CommandOutput, FsError> {
        Ok(self.runner.run(spec).await?)
    }
}
